use clap::{Parser, Subcommand};
use dotenvy::dotenv;

#[derive(Parser)]
#[command(name = "classlink-cli", about = "ClassLink administration commands")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a superadmin account
    CreateSuperadmin {
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Seed a demo school with a teacher and a student
    SeedDemo,
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database");

    match cli.command {
        Commands::CreateSuperadmin {
            full_name,
            email,
            password,
        } => match classlink::cli::create_superadmin(&pool, &full_name, &email, &password).await {
            Ok(()) => {
                println!("✅ Superadmin created successfully!");
                println!("   Email: {email}");
                println!("   Name: {full_name}");
            }
            Err(e) => {
                eprintln!("❌ Error creating superadmin: {e}");
                std::process::exit(1);
            }
        },
        Commands::SeedDemo => match classlink::cli::seed_demo(&pool).await {
            Ok(()) => {
                println!("✅ Demo school seeded (teacher@example.com / student@example.com)");
            }
            Err(e) => {
                eprintln!("❌ Error seeding demo data: {e}");
                std::process::exit(1);
            }
        },
    }
}
