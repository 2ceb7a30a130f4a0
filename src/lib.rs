pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod realtime;
pub mod schema;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::order_service::OrderService;
use config::Config;
use infrastructure::order_repo::DieselOrderRepository;
use infrastructure::resend_mailer::ResendMailer;
use infrastructure::status_cache::FileStatusCache;
use realtime::OrderEvents;

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) {
    let mut conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");
}

/// Shared application state: the order lifecycle service and the realtime
/// change feed it publishes into.
pub struct AppState {
    pub service: OrderService<DieselOrderRepository, ResendMailer, FileStatusCache>,
    pub events: OrderEvents,
}

impl AppState {
    pub fn new(pool: DbPool, config: &Config) -> Self {
        let events = OrderEvents::default();
        let service = OrderService::new(
            DieselOrderRepository::new(pool),
            ResendMailer::new(&config.mail),
            FileStatusCache::new(config.status_cache_path.clone()),
            events.clone(),
        );
        AppState { service, events }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::orders::create_order,
        handlers::orders::get_order,
        handlers::orders::list_orders,
        handlers::orders::upload_receipt,
        handlers::orders::update_shipping,
        handlers::events::order_events,
        handlers::action_links::customer_confirm,
        handlers::action_links::customer_reject,
    ),
    components(schemas(
        handlers::orders::CreateOrderRequest,
        handlers::orders::CreateOrderResponse,
        handlers::orders::OrderResponse,
        handlers::orders::OrderItemDto,
        handlers::orders::ShippingInfoDto,
        handlers::orders::ListOrdersResponse,
        handlers::orders::UploadReceiptRequest,
        handlers::orders::UploadReceiptResponse,
        handlers::orders::UpdateShippingRequest,
        handlers::action_links::ActionLinkResponse,
    )),
    tags(
        (name = "orders", description = "Order lifecycle"),
        (name = "order-status", description = "Email action links"),
    )
)]
pub struct ApiDoc;

/// Route table, shared between the real server and in-process tests.
pub fn app_routes(state: web::Data<AppState>) -> impl Fn(&mut web::ServiceConfig) + Clone {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(state.clone())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
            .service(
                web::scope("/orders")
                    .route("", web::post().to(handlers::orders::create_order))
                    .route("", web::get().to(handlers::orders::list_orders))
                    // Registered before /{id} so "events" is not read as an id.
                    .route("/events", web::get().to(handlers::events::order_events))
                    .route("/{id}", web::get().to(handlers::orders::get_order))
                    .route(
                        "/{id}/receipt",
                        web::post().to(handlers::orders::upload_receipt),
                    )
                    .route(
                        "/{id}/shipping",
                        web::put().to(handlers::orders::update_shipping),
                    ),
            )
            .service(
                web::scope("/order-status")
                    .route(
                        "/customer-confirm",
                        web::get().to(handlers::action_links::customer_confirm),
                    )
                    .route(
                        "/customer-reject",
                        web::get().to(handlers::action_links::customer_reject),
                    ),
            );
    }
}

/// Build and return an actix-web `Server` bound to the configured host:port.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(pool: DbPool, config: &Config) -> std::io::Result<actix_web::dev::Server> {
    let state = web::Data::new(AppState::new(pool, config));
    let host = config.host.clone();
    let port = config.port;

    Ok(HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .configure(app_routes(state.clone()))
    })
    .bind((host, port))?
    .run())
}
