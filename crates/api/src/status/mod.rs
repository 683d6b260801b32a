use actix_web::{web, HttpResponse};
use pillbox_api_structs::get_service_health::*;
use pillbox_infra::PillboxContext;

async fn status(ctx: web::Data<PillboxContext>) -> HttpResponse {
    HttpResponse::Ok().json(APIResponse {
        message: "Yo! We are up!\r\n".into(),
        reminder_scan_interval_secs: ctx.config.reminder_scan_interval.as_secs(),
    })
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(status));
}
