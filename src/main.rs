use eccu_client::{
    Cli, Command, ConfigManager, EccuError, EccuService, EntryRenderer, PublishArgs, SoapError,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_args();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| cli.log_filter().into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ConfigManager::load_config(&cli).await?;
    let service = EccuService::from_config(&config)?;
    let renderer = EntryRenderer::new();

    match run(&cli.command, &service, &renderer).await {
        Ok(()) => Ok(()),
        Err(err) => match err.user_message() {
            Some(message) => {
                println!("{}", message);
                Ok(())
            }
            None => Err(err.into()),
        },
    }
}

async fn run(
    command: &Command,
    service: &EccuService,
    renderer: &EntryRenderer,
) -> eccu_client::Result<()> {
    match command {
        Command::Requests { content } => {
            let requests = service.all(*content).await?;
            print!("{}", renderer.render_all(&requests));
        }
        Command::LastRequest { content } => match service.last(*content).await? {
            Some(request) => print!("{}", renderer.render(&request)),
            None => println!("No requests found."),
        },
        Command::PublishXml(args) => match publish(args, service, renderer).await {
            Err(EccuError::Soap(fault @ SoapError::Fault { .. })) => println!("{}", fault),
            other => other?,
        },
    }
    Ok(())
}

async fn publish(
    args: &PublishArgs,
    service: &EccuService,
    renderer: &EntryRenderer,
) -> eccu_client::Result<()> {
    let id = service
        .publish_file(
            &args.property,
            &args.source,
            args.property_options(),
            args.request_options(),
        )
        .await?;

    println!("Request correctly published:");
    print!("{}", renderer.render(&service.find(id, true).await?));
    Ok(())
}
