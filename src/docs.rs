use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::modules::auth::controller::ErrorResponse;
use crate::modules::auth::model::{LoginRequest, LoginResponse, MessageResponse};
use crate::modules::disciplines::model::{
    AssignDisciplineDto, CreateDisciplineDto, Discipline, TeacherDiscipline, TeacherDisciplineView,
};
use crate::modules::invites::model::{
    InviteCodeResponse, InviteSummary, LinkedStudent, LinkedTeacher, UseInviteDto,
};
use crate::modules::registration::model::{
    CreateRegistrationDto, IndependentRegistrationDto, RegistrationRequest, RequestStatus,
};
use crate::modules::schools::model::{
    CreateSchoolAdminDto, CreateSchoolDto, School, SchoolAdminResponse, VerifySchoolCodeDto,
};
use crate::modules::users::model::{User, UserRole, UserSummary};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login_user,
        crate::modules::users::controller::get_profile,
        crate::modules::users::controller::get_students,
        crate::modules::schools::controller::create_school,
        crate::modules::schools::controller::get_all_schools,
        crate::modules::schools::controller::verify_school_code,
        crate::modules::schools::controller::create_school_admin,
        crate::modules::registration::controller::submit_registration,
        crate::modules::registration::controller::submit_independent_registration,
        crate::modules::registration::controller::list_pending_requests,
        crate::modules::registration::controller::approve_request,
        crate::modules::registration::controller::reject_request,
        crate::modules::disciplines::controller::create_discipline,
        crate::modules::disciplines::controller::get_school_disciplines,
        crate::modules::disciplines::controller::assign_discipline,
        crate::modules::disciplines::controller::unassign_discipline,
        crate::modules::disciplines::controller::my_disciplines,
        crate::modules::invites::controller::create_invite,
        crate::modules::invites::controller::use_invite,
        crate::modules::invites::controller::my_invites,
        crate::modules::invites::controller::linked_students,
        crate::modules::invites::controller::my_teachers,
    ),
    components(
        schemas(
            ErrorResponse,
            MessageResponse,
            LoginRequest,
            LoginResponse,
            User,
            UserRole,
            UserSummary,
            School,
            CreateSchoolDto,
            VerifySchoolCodeDto,
            CreateSchoolAdminDto,
            SchoolAdminResponse,
            RegistrationRequest,
            RequestStatus,
            CreateRegistrationDto,
            IndependentRegistrationDto,
            Discipline,
            CreateDisciplineDto,
            AssignDisciplineDto,
            TeacherDiscipline,
            TeacherDisciplineView,
            UseInviteDto,
            InviteCodeResponse,
            InviteSummary,
            LinkedStudent,
            LinkedTeacher,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Login and token issuance"),
        (name = "Users", description = "User directory"),
        (name = "Schools", description = "School management"),
        (name = "Registration", description = "Registration request workflow"),
        (name = "Disciplines", description = "Subject management and teacher assignment"),
        (name = "Invites", description = "Invite code issuance and redemption")
    ),
    info(
        title = "ClassLink API",
        version = "0.1.0",
        description = "School-management REST API with invite-code based teacher-student linking.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
