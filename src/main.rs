use clap::Parser;
use lpvault::cli::{commands, Cli, Commands};
use lpvault::generator::GeneratorOptions;

fn main() {
    lpvault::logging::init_logging();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => commands::init::execute(&cli),
        Commands::List {
            ref category,
            favorites,
            ref search,
        } => commands::list::execute(&cli, category.as_deref(), favorites, search.as_deref()),
        Commands::Show { ref id, reveal } => commands::show::execute(&cli, id, reveal),
        Commands::Copy { ref id } => commands::copy::execute(&cli, id),
        Commands::Add { ref kind } => commands::add::execute(&cli, kind),
        Commands::Delete { ref id, force } => commands::delete::execute(&cli, id, force),
        Commands::Favorite { ref id } => commands::favorite::execute(&cli, id),
        Commands::Passwd => commands::passwd::execute(&cli),
        Commands::Backup {
            ref output,
            password,
        } => commands::backup::execute(&cli, output.as_deref(), password),
        Commands::Restore {
            ref file,
            ref policy,
            force,
        } => commands::restore::execute(&cli, file, policy, force),
        Commands::Info { ref file } => commands::info::execute(file),
        Commands::Generate {
            length,
            no_uppercase,
            no_digits,
            no_symbols,
            allow_similar,
        } => commands::generate::execute(&GeneratorOptions {
            length,
            uppercase: !no_uppercase,
            digits: !no_digits,
            symbols: !no_symbols,
            exclude_similar: !allow_similar,
        }),
    };

    if let Err(e) = result {
        lpvault::cli::output::error(&e.to_string());
        if e.is_corruption() {
            lpvault::cli::output::tip("Restore from a backup with `lpvault restore <file> --policy replace`.");
        }
        std::process::exit(1);
    }
}
