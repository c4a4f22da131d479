use crate::args::AskArgs;
use crate::commands::{open_finance, Out};
use crate::intent::Intent;
use crate::{Config, Result};

/// Answers a plain-language request. The structured output is the detected intent.
pub async fn ask(config: Config, args: AskArgs) -> Result<Out<Intent>> {
    let transcript = args.transcript();
    let intent = Intent::detect(&transcript);
    let finance = open_finance(&config).await;
    let response = intent.respond(&finance.totals(), finance.locale());
    Ok(Out::new(response, intent))
}
