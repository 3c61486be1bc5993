use super::handlers;
use actix_web::web;

/// Wires the REST surface onto the Actix app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(handlers::health)).service(
        web::scope("/api")
            .service(
                web::scope("/checkout")
                    .route("/create-order", web::post().to(handlers::create_order))
                    .route("/verify-payment", web::post().to(handlers::verify_payment)),
            )
            .route(
                "/calculate-shipping",
                web::post().to(handlers::calculate_shipping),
            )
            .service(
                web::scope("/products")
                    .route("", web::get().to(handlers::list_products))
                    .route("/{product_id}", web::get().to(handlers::get_product)),
            )
            .route(
                "/custom-orders",
                web::post().to(handlers::submit_custom_order),
            )
            .service(
                web::scope("/orders")
                    .route("/{order_number}", web::get().to(handlers::get_order))
                    .route(
                        "/{order_number}/status",
                        web::post().to(handlers::update_order_status),
                    ),
            ),
    );
}
