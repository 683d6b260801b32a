pub mod api {
    use serde::{Deserialize, Serialize};

    pub mod get_service_health {
        use super::*;

        #[derive(Debug, Deserialize, Serialize)]
        #[serde(rename_all = "camelCase")]
        pub struct APIResponse {
            pub message: String,
            /// How often due reminders are looked for
            pub reminder_scan_interval_secs: u64,
        }
    }
}
