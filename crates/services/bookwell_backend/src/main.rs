// File: crates/services/bookwell_backend/src/main.rs
use axum::{routing::get, Router};
use bookwell_availability::routes as availability_routes;
use bookwell_booking::routes as booking_routes;
use bookwell_config::load_config;
use bookwell_db::{DbClient, Repositories};
#[cfg(feature = "gcal")]
use bookwell_gcal::routes as gcal_routes;
#[cfg(feature = "reminders")]
use bookwell_reminders::routes as reminder_routes;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() {
    let config = Arc::new(load_config().expect("Failed to load config"));
    bookwell_common::logging::init();

    let db_client = DbClient::new(&config)
        .await
        .expect("Failed to connect to database");
    let repos = Arc::new(
        Repositories::init(db_client)
            .await
            .expect("Failed to initialize database schema"),
    );

    let base_router = Router::new().route("/", get(|| async { "Welcome to Bookwell API!" }));

    let availability_router = availability_routes::routes(repos.clone());
    let booking_router = booking_routes::routes(repos.clone());

    #[cfg(feature = "gcal")]
    let gcal_router = if config.use_gcal && config.gcal.is_some() {
        info!("💡 Busy-time sync enabled, adding /sync routes");
        Some(gcal_routes::routes(config.clone(), repos.clone()).await)
    } else {
        None
    };

    #[cfg(feature = "reminders")]
    let reminders_router = if config.use_reminders && config.notify.is_some() {
        info!("💡 Reminder batch enabled, adding /reminders routes");
        Some(reminder_routes::routes(config.clone(), repos.clone()))
    } else {
        None
    };

    let api_router = Router::new().nest("/api", {
        #[allow(unused_mut)] // mutable only when optional features are on
        let mut router = base_router
            .merge(availability_router)
            .merge(booking_router);
        #[cfg(feature = "gcal")]
        if let Some(r) = gcal_router {
            router = router.merge(r);
        }
        #[cfg(feature = "reminders")]
        if let Some(r) = reminders_router {
            router = router.merge(r);
        }
        router
    });

    let mut app = api_router;

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(feature = "openapi")]
    {
        use bookwell_availability::doc::AvailabilityApiDoc;
        use bookwell_booking::doc::BookingApiDoc;
        #[cfg(feature = "gcal")]
        use bookwell_gcal::doc::GcalApiDoc;
        #[cfg(feature = "reminders")]
        use bookwell_reminders::doc::RemindersApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "Bookwell API",
                version = "0.1.0",
                description = "Bookwell practitioner-booking API docs",
                license(name = "MIT", url = "https://opensource.org/licenses/MIT")
            ),
            components(),
            tags( (name = "Bookwell", description = "Core service endpoints")),
            servers( (url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        #[allow(unused_mut)] // mutable only when optional features are on
        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(AvailabilityApiDoc::openapi());
        openapi_doc.merge(BookingApiDoc::openapi());
        #[cfg(feature = "gcal")]
        openapi_doc.merge(GcalApiDoc::openapi());
        #[cfg(feature = "reminders")]
        openapi_doc.merge(RemindersApiDoc::openapi());

        info!("📖 Adding Swagger UI at /api/docs");
        let swagger_ui = SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc);
        app = app.merge(swagger_ui);
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await.unwrap();
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service())
        .await
        .unwrap();
}
