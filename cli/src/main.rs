mod commands;
mod terminal;

use commands::remote::RemoteTarget;
use commands::{CommandLine, Commands, backup, diagnostic, eol, inventory, remote, report, sweep};
use ntl_core::audit::AuditService;
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();
    let cfg = commands.to_config();
    let writer = commands.writer(&cfg);
    let writer = writer.as_ref();

    logging::init_logging(cfg.quiet);
    print::banner(cfg.quiet);

    let quiet = cfg.quiet;
    let result = match commands.command {
        Commands::Sweep { network } => {
            let service = AuditService::from_config(cfg);
            sweep::sweep(&network, &service, writer).await
        }
        Commands::Eol { os } => {
            let service = AuditService::from_config(cfg);
            eol::eol(&os.join(" "), &service, writer)
        }
        Commands::Inventory { csv } => {
            let service = AuditService::from_config(cfg);
            inventory::inventory(&csv, &service, writer)
        }
        Commands::Report { network } => {
            let service = AuditService::from_config(cfg);
            report::report(&network, &service, writer).await
        }
        Commands::Ping { host } => diagnostic::ping(&host, &cfg, writer).await,
        Commands::AdDns { server } => diagnostic::ad_dns(&server, &cfg, writer).await,
        Commands::Mysql { host } => diagnostic::mysql(&host, &cfg, writer).await,
        Commands::FullDiagnostic => diagnostic::full_diagnostic(&cfg, writer).await,
        Commands::Backup { host } => backup::backup(&host, &cfg, writer).await,
        Commands::Export { host, table } => backup::export(&host, &table, &cfg, writer).await,
        Commands::BackupTables { host } => backup::backup_tables(&host, &cfg, writer).await,
        Commands::Remote {
            host,
            user,
            port,
            identity,
            channel,
            command,
        } => {
            let target = RemoteTarget {
                host,
                user,
                port,
                identity,
                channel,
            };
            remote::remote(target, &command.join(" "), &cfg, writer).await
        }
    };

    print::closing(quiet);
    result
}
