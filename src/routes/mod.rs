use actix_web::{http::header, web, HttpResponse};

pub mod generate;
pub mod health;
pub mod pages;
pub mod trips;

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(pages::home))
        .service(
            web::resource("/generate")
                .route(web::get().to(generate::generate_form))
                .route(web::post().to(generate::generate_trip)),
        )
        .route("/save", web::post().to(generate::save_trip))
        .route("/my-trips", web::get().to(trips::my_trips))
        .service(
            web::resource("/edit-trip/{id}")
                .route(web::get().to(trips::edit_trip_form))
                .route(web::post().to(trips::edit_trip)),
        )
        .route("/trip/{id}", web::get().to(trips::view_trip))
        .route("/delete-trip/{id}", web::get().to(trips::delete_trip))
        .route("/about", web::get().to(pages::about))
        .service(
            web::resource("/contact")
                .route(web::get().to(pages::contact_form))
                .route(web::post().to(pages::contact)),
        )
        .route("/health", web::get().to(health::health_check));
}
