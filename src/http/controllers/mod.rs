use actix_web::web;
use thiserror::Error;

use crate::{
  error::Error,
  types::{
    self,
    id::{marker::Marker, Id},
  },
};

pub mod invitations;
pub mod users;

pub fn configure(cfg: &mut web::ServiceConfig) {
  cfg
    .app_data(web::JsonConfig::default().error_handler(super::util::handle_json_error))
    .service(
      web::scope("/users")
        .service(
          web::resource("/@me")
            .route(web::get().to(users::me))
            .route(web::patch().to(users::update_me)),
        )
        .route("/@me/token", web::post().to(users::rotate_token))
        .route("/@me/verification", web::post().to(users::resend_verification))
        .route("/login", web::post().to(users::login))
        .route("/register", web::post().to(users::register))
        .route("/verify", web::post().to(users::verify)),
    )
    .service(
      web::scope("/invitations")
        .route("", web::post().to(invitations::create))
        .route("/{id}", web::get().to(invitations::get))
        .route("/{id}/accept", web::post().to(invitations::accept)),
    );
}

/// Ids in a path that don't parse can't point to anything.
pub(crate) fn parse_id<T: Marker>(raw: &str) -> Result<Id<T>, Error> {
  #[derive(Debug, Error)]
  #[error("Malformed id in path")]
  struct MalformedId;

  raw
    .parse()
    .map_err(|_| Error::from_context(types::Error::NotFound, MalformedId))
}
