use std::{env, io};

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use log::{error, info};

use retreat_pricing_api::{
    db::{
        self,
        pricing_store::{MongoPricingStore, DEFAULT_DATABASE},
    },
    routes,
    services::pricing_service::PricingService,
};

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;

fn cors() -> Cors {
    let origins: Vec<String> = env::var("CORS_ALLOWED_ORIGINS")
        .unwrap_or_default()
        .split(',')
        .map(|origin| origin.trim().to_string())
        .filter(|origin| !origin.is_empty())
        .collect();

    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST"])
        .allow_any_header()
        .max_age(3600);

    if origins.is_empty() {
        return cors.allow_any_origin();
    }

    origins
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    }

    env_logger::init_from_env(Env::default().default_filter_or("info"));
    info!("Application starting...");

    let host = env::var("HOST").unwrap_or_else(|_| HOST.to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| PORT.to_string())
        .parse()
        .unwrap_or(PORT);

    let mongo_uri = env::var("MONGODB_URI").map_err(|_| {
        error!("MONGODB_URI must be set");
        io::Error::new(io::ErrorKind::InvalidInput, "MONGODB_URI must be set")
    })?;
    let client = db::mongo::create_mongo_client(&mongo_uri)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    let database = env::var("PRICING_DATABASE").unwrap_or_else(|_| DEFAULT_DATABASE.to_string());
    let store = web::Data::new(MongoPricingStore::new(client.clone(), database));
    let pricing = web::Data::new(PricingService::new());
    let mongo = web::Data::new(client);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .wrap(cors())
            .wrap(Logger::default())
            .app_data(mongo.clone())
            .app_data(store.clone())
            .app_data(pricing.clone())
            .route("/health", web::get().to(routes::health::health_check))
            .configure(routes::configure::<MongoPricingStore>)
    })
    .bind((host, port))?
    .run()
    .await
}
