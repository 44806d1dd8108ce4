mod auth;
mod command;
mod config;
mod cors;
mod github;
mod handlers;
mod types;

use config::AppConfig;
use github::{GitHubClient, Repository};
use log::{error, info};
use rocket::{Build, Rocket, catchers, fairing, fairing::AdHoc, launch, routes};
use std::net::Ipv4Addr;
use std::sync::Arc;

pub type SharedRepository = Arc<dyn Repository>;

/// Routes, catchers and fairings around a configuration. The repository is
/// managed separately so it can be swapped out.
pub fn server(config: AppConfig) -> Rocket<Build> {
    let port = config.port;

    rocket::build()
        .manage(config)
        .attach(cors::Cors)
        .attach(AdHoc::on_liftoff("Startup report", |rocket| {
            Box::pin(async move {
                if let Some(config) = rocket.state::<AppConfig>() {
                    config.warn_missing();
                    info!("Proxying {}/{} via {}", config.owner, config.repo, config.api_base);
                }
            })
        }))
        .mount("/", routes![cors::preflight])
        .mount(
            "/api",
            routes![
                handlers::health,
                handlers::list,
                handlers::delete,
                handlers::create,
                handlers::dispatch
            ],
        )
        .register(
            "/api",
            catchers![
                handlers::unauthorized,
                handlers::bad_request,
                handlers::not_found,
                handlers::internal
            ],
        )
        .configure(rocket::Config {
            port,
            address: Ipv4Addr::UNSPECIFIED.into(),
            ..rocket::Config::default()
        })
}

async fn connect_github(rocket: Rocket<Build>) -> fairing::Result {
    let client = match rocket.state::<AppConfig>() {
        Some(config) => GitHubClient::new(config),
        None => return Err(rocket),
    };

    match client {
        Ok(client) => Ok(rocket.manage::<SharedRepository>(Arc::new(client))),
        Err(e) => {
            error!("Failed to set up GitHub client: {}", e);
            Err(rocket)
        }
    }
}

#[launch]
fn rocket() -> Rocket<Build> {
    dotenvy::dotenv().ok();

    server(AppConfig::from_env()).attach(AdHoc::try_on_ignite("GitHub client", connect_github))
}
