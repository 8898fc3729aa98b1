use anyhow::Context;
use recaptcha_assessment::{
    AssessmentClient, Config, Driver, LineInput, ReqwestPoster, ServiceAccountTokenSource,
    build_http_client, telemetry::init_tracing,
};
use tokio::io::BufReader;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;
    init_tracing(&config.tracing);

    info!(
        project_id = %config.assessment.project_id,
        credentials = %config.credentials_path.display(),
        "Starting reCAPTCHA assessment"
    );

    let http = build_http_client(&config.http).context("failed to build HTTP client")?;
    let tokens = ServiceAccountTokenSource::new(config.credentials_path.clone(), http.clone());
    let client = AssessmentClient::new(config.assessment, tokens, ReqwestPoster::new(http));

    // A finished cycle exits 0 whether the token checked out or not.
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    Driver::new(&client)
        .run(LineInput::new(stdin), &mut stdout)
        .await;

    Ok(())
}
