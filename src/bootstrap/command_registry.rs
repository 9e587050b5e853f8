use clap::{Arg, ArgMatches, Command};

use crate::app_bootstrap::AppConfig;

/// 构建完整的命令行应用
pub fn build_app() -> Command {
    Command::new("datalayer-server")
        .version(env!("CARGO_PKG_VERSION"))
        .about("仓库模式数据访问层的演示服务 / Demo server for the repository data layer")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("server")
                .about("启动 Web 服务器")
                .arg(
                    Arg::new("host")
                        .long("host")
                        .value_name("HOST")
                        .help("设置服务器主机地址"),
                )
                .arg(
                    Arg::new("port")
                        .short('p')
                        .long("port")
                        .value_name("PORT")
                        .help("设置服务器端口")
                        .value_parser(clap::value_parser!(u16)),
                )
                .arg(
                    Arg::new("workers")
                        .short('w')
                        .long("workers")
                        .value_name("WORKERS")
                        .help("设置工作线程数")
                        .value_parser(clap::value_parser!(usize)),
                ),
        )
        .subcommand(Command::new("version").about("显示版本信息"))
}

/// 命令行参数覆盖配置文件中的 `server.*`
/// Command line flags override `server.*` from the config files
pub fn apply_server_args(mut config: AppConfig, matches: &ArgMatches) -> AppConfig {
    if let Some(host) = matches.get_one::<String>("host") {
        config.host = host.clone();
    }
    if let Some(port) = matches.get_one::<u16>("port") {
        config.port = *port;
    }
    if let Some(workers) = matches.get_one::<usize>("workers") {
        config.workers = Some(*workers);
    }
    config
}

/// 版本信息
pub fn version_text() -> String {
    format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_args_override_config() {
        let matches = build_app()
            .try_get_matches_from(["datalayer-server", "server", "--port", "8081", "-w", "2"])
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "server");
        let config = apply_server_args(AppConfig::default(), sub);
        assert_eq!(config.port, 8081);
        assert_eq!(config.workers, Some(2));
        assert_eq!(config.host, "0.0.0.0");
    }

    #[test]
    fn test_subcommand_required() {
        assert!(build_app().try_get_matches_from(["datalayer-server"]).is_err());
        let matches = build_app()
            .try_get_matches_from(["datalayer-server", "version"])
            .unwrap();
        assert_eq!(matches.subcommand_name(), Some("version"));
    }
}
