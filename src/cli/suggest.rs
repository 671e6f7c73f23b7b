//! Define suggest subcommand
use crate::context::AppContext;
use crate::resolver::{is_queryable, AddressResolver, Field, MIN_QUERY_CHARS};
use structopt::StructOpt;

/// Ask the backend for places matching partial input
#[derive(Debug, StructOpt)]
pub struct SuggestOpts {
    /// Partial address or place name
    #[structopt(name = "TEXT")]
    text: String,
    /// Treat the input as the destination field instead of the origin
    #[structopt(short, long)]
    destination: bool,
}

pub async fn suggest_command(
    ctx: &mut AppContext,
    opts: SuggestOpts,
) -> Result<(), Box<dyn std::error::Error>> {
    let field = if opts.destination {
        Field::Destination
    } else {
        Field::Origin
    };
    if !is_queryable(&opts.text) {
        println!("Type at least {} characters to get suggestions", MIN_QUERY_CHARS);
        return Ok(());
    }

    let mut resolver = AddressResolver::new();
    let suggestions = resolver.suggest(field, &opts.text, &ctx.backend).await;
    if suggestions.is_empty() {
        println!("No suggestions for {:?}", opts.text);
    }
    for (idx, suggestion) in suggestions.iter().enumerate() {
        println!("{:>3}  {}  [{}]", idx, suggestion.description(), suggestion.id());
    }

    Ok(())
}
