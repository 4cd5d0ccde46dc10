use actix_web::{web, Responder};
use log::info;

use crate::middleware::session_context::SessionContext;
use crate::models::contact::ContactMessage;
use crate::models::flash::FlashMessage;
use crate::routes::redirect;
use crate::views::{render, AboutTemplate, ContactTemplate, IndexTemplate};

/*
    /
*/
pub async fn home(session: SessionContext) -> impl Responder {
    render(&IndexTemplate {
        active: "home",
        flashes: session.take_flashes(),
    })
}

/*
    /about
*/
pub async fn about(session: SessionContext) -> impl Responder {
    render(&AboutTemplate {
        active: "about",
        flashes: session.take_flashes(),
    })
}

/*
    /contact
*/
pub async fn contact_form(session: SessionContext) -> impl Responder {
    render(&ContactTemplate {
        active: "contact",
        flashes: session.take_flashes(),
    })
}

// Messages are acknowledged but neither stored nor forwarded.
pub async fn contact(session: SessionContext, input: web::Form<ContactMessage>) -> impl Responder {
    let message = input.into_inner();
    info!(
        "Contact form submitted (name: {}, email: {}, {} chars), discarding",
        message.name.is_some(),
        message.email.is_some(),
        message.message.as_deref().map(str::len).unwrap_or(0)
    );

    session.flash(FlashMessage::success(
        "Thank you for your message! We will get back to you soon.",
    ));
    redirect("/contact")
}
