use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use auracheck::api::{configure_routes, AppState};
use auracheck::shutdown::ShutdownSignals;
use auracheck::{banner, config};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    banner::print_banner();

    if let Err(e) = dotenvy::dotenv() {
        eprintln!("⚠️  Warning: Could not load .env file: {}", e);
    }

    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let app_config = config::AppConfig::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    match &app_config.gemini {
        Some(gemini) => log::info!(
            "✅ GEMINI_API_KEY loaded: {}... (L: {})",
            gemini.api_key.chars().take(4).collect::<String>(),
            gemini.api_key.len()
        ),
        None => log::warn!("❌ GEMINI_API_KEY not set, scans will fail"),
    }
    if app_config.payments.secret_key.is_none() {
        log::warn!("❌ STRIPE_SECRET_KEY not set, checkout will fail");
    }
    log::info!(
        "🔁 {} candidate(s), policy {:?}, discovery {}, timeout {:?}ms",
        app_config.resolver.candidates.len(),
        app_config.resolver.retry_policy,
        app_config.resolver.discovery.enabled,
        app_config.resolver.timeout_ms
    );

    let bind = (app_config.host.clone(), app_config.port);
    let state = AppState::new(app_config);
    let shutdown = state.shutdown.clone();

    log::info!("🚀 Starting server on {}:{}", bind.0, bind.1);

    let server = HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .configure(configure_routes)
    })
    .bind(bind)?
    .disable_signals()
    .run();

    let mut signals = ShutdownSignals::install()?;
    let handle = server.handle();
    actix_web::rt::spawn(async move {
        let received = signals.recv().await;
        log::info!("🛑 {} received, cancelling in-flight scans", received);
        shutdown.cancel();
        handle.stop(true).await;
    });

    server.await
}
