use crate::{
    api::{assignment, attendance, budget, health, work, worker},
    auth::middleware::auth_middleware,
    config::Config,
    reconcile::{MySqlStore, SystemClock},
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use anyhow::{Result, anyhow};

pub type LimiterConfig = GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-IP limiter allowing `requests_per_min` with an equal burst.
pub fn build_limiter(requests_per_min: u32) -> Result<LimiterConfig> {
    let per_ms = 60_000 / u64::from(requests_per_min.max(1));
    GovernorConfigBuilder::default()
        .per_millisecond(per_ms.max(1))
        .burst_size(requests_per_min.max(1))
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow!("invalid rate limit of {requests_per_min} requests per minute"))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, limiter: &LimiterConfig) {
    // Public routes
    cfg.service(health::index).service(health::health);

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(Governor::new(limiter)) // rate limiting
            .service(
                web::scope("/workers")
                    .service(
                        web::resource("")
                            .route(web::post().to(worker::create_worker))
                            .route(web::get().to(worker::list_workers)),
                    )
                    .service(
                        web::resource("/{dni}")
                            .route(web::get().to(worker::get_worker))
                            .route(web::put().to(worker::update_worker))
                            .route(web::delete().to(worker::delete_worker)),
                    ),
            )
            .service(
                web::scope("/works")
                    .service(
                        web::resource("")
                            .route(web::post().to(work::create_work))
                            .route(web::get().to(work::list_works)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(work::get_work))
                            .route(web::put().to(work::update_work))
                            .route(web::delete().to(work::delete_work)),
                    ),
            )
            .service(
                web::scope("/budgets")
                    .service(
                        web::resource("")
                            .route(web::post().to(budget::create_budget))
                            .route(web::get().to(budget::list_budgets)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(budget::get_budget))
                            .route(web::put().to(budget::update_budget))
                            .route(web::delete().to(budget::delete_budget)),
                    ),
            )
            .service(
                web::scope("/assignments")
                    .service(
                        web::resource("")
                            .route(web::post().to(assignment::create_assignment))
                            .route(web::get().to(assignment::list_assignments)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(assignment::get_assignment))
                            .route(web::put().to(assignment::update_assignment))
                            .route(web::delete().to(assignment::delete_assignment)),
                    ),
            )
            .service(
                web::scope("/attendance")
                    // /attendance
                    .service(
                        web::resource("")
                            .route(web::post().to(attendance::set_status::<MySqlStore, SystemClock>))
                            .route(web::get().to(attendance::list_attendance)),
                    )
                    // registered before /{id} so they are not read as ids
                    .service(
                        web::resource("/check-in")
                            .route(web::post().to(attendance::check_in::<MySqlStore, SystemClock>)),
                    )
                    .service(
                        web::resource("/check-out")
                            .route(web::post().to(attendance::check_out::<MySqlStore, SystemClock>)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(attendance::get_attendance))
                            .route(web::delete().to(attendance::delete_attendance)),
                    ),
            ),
    );
}
