use std::sync::Arc;

use clap::Parser;
use poem::{listener::TcpListener, Route, Server};
use poem_openapi::OpenApiService;

use rewire_backend::api::{AuthApi, HealthApi, ManageUsersApi};
use rewire_backend::app_data::AppData;
use rewire_backend::cli::{seed, Cli, Commands};
use rewire_backend::config::{init_database, init_logging, run_migrations, AppSettings};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    init_logging()?;

    let cli = Cli::parse();
    let settings = AppSettings::from_env()?;

    let db = init_database(&settings.database_url).await?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Migrate => {
            run_migrations(&db).await?;
        }
        Commands::Seed { demo } => {
            run_migrations(&db).await?;
            let app_data = AppData::init(db, &settings);
            seed::seed_roles(&app_data).await?;
            if demo {
                seed::seed_demo_users(&app_data, &settings.password_pepper).await?;
            }
        }
        Commands::Serve => {
            run_migrations(&db).await?;
            let app_data = Arc::new(AppData::init(db, &settings));
            seed::seed_roles(&app_data).await?;
            serve(app_data, &settings).await?;
        }
    }

    Ok(())
}

async fn serve(app_data: Arc<AppData>, settings: &AppSettings) -> Result<(), std::io::Error> {
    let auth_api = AuthApi::new(Arc::clone(&app_data));
    let users_api = ManageUsersApi::new(Arc::clone(&app_data));

    let api_service = OpenApiService::new(
        (HealthApi, auth_api, users_api),
        "Rewire User Management API",
        env!("CARGO_PKG_VERSION"),
    )
    .server(format!("http://{}/api", settings.bind_addr));

    let ui = api_service.swagger_ui();
    let app = Route::new().nest("/api", api_service).nest("/swagger", ui);

    tracing::info!("Starting server on http://{}", settings.bind_addr);
    tracing::info!("Swagger UI available at http://{}/swagger", settings.bind_addr);

    Server::new(TcpListener::bind(settings.bind_addr.clone()))
        .run(app)
        .await
}
