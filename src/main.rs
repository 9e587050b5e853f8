use clap::ArgMatches;
use std::error::Error;

use datalayer_server::error::AppResult;
use datalayer_server::{
    apply_server_args, build_app, init_logging, init_routes, version_text, AppBootstrap, AppConfig,
};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let matches: ArgMatches = build_app().get_matches();

    match matches.subcommand() {
        Some(("server", sub_matches)) => {
            handle_server_command(sub_matches).await?;
        }
        Some(("version", _)) => {
            println!("{}", version_text());
        }
        _ => {
            // subcommand_required(true) 时不会出现
            eprintln!("未知命令，请使用 --help 查看可用命令");
            std::process::exit(1);
        }
    }

    Ok(())
}

async fn handle_server_command(matches: &ArgMatches) -> AppResult<()> {
    // 配置 → 日志 → 路由 → 启动
    init_logging()?;
    init_routes();

    let config = apply_server_args(AppConfig::from_config()?, matches);
    AppBootstrap::new().with_config(config).run().await
}
