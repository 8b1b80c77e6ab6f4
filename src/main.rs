use clap::Parser;
use console::style;

use revlook::args::RevlookArgs;
use revlook::logging::setup_logging;

#[tokio::main]
async fn main() {
    let args = RevlookArgs::parse();
    setup_logging(args.verbose);

    // * setup failures are reported on stdout and the process still exits normally
    if let Err(e) = revlook::run(&args).await {
        println!("{}", style(format!("{e:#}")).red());
    }
}
