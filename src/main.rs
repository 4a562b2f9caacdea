#[cfg(all(target_os = "linux", target_env = "musl"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub mod bot;
pub mod config;
pub mod crawler;
pub mod declare;
pub mod logging;
pub mod util;

use std::process::ExitCode;

use crate::config::App;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    // 缺少 token 等設定錯誤時直接結束，不連線 Telegram
    let app = match App::get() {
        Ok(app) => app,
        Err(why) => {
            logging::error_console(format!("Failed to load configuration because {}", why));
            logging::error_file_async(format!("Failed to load configuration because {:?}", why));
            return ExitCode::FAILURE;
        }
    };

    logging::info_console(format!(
        "Starting Gold Price Bot ({} mode, {})",
        app.gold.mode, app.gold.currency
    ));

    if let Err(why) = bot::run(&app).await {
        logging::error_file_async(format!("Gold price bot stopped because {:?}", why));
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
