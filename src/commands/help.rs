/// Command reference shown by `help`
pub fn execute() -> String {
    [
        "📖 Commands",
        "  select <id>      Load a listed asset (e.g. `select bitcoin`)",
        "  search <symbol>  Load any symbol (e.g. `search eth`)",
        "  refresh          Reload the current asset",
        "  info             Price cards and market details",
        "  json             Current snapshot as JSON",
        "  list             Popular cryptocurrencies",
        "  chart [path]     Write the 30-day chart to a PNG file",
        "  help             This message",
        "  quit             Leave the dashboard",
    ]
    .join("\n")
}
