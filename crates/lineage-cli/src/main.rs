mod serve;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use lineage_core::person::format_nin;
use lineage_core::relation::MAX_GENERATION;
use lineage_core::{
    AncestryTree, Config, FileStorage, LayoutMode, NewPerson, Person, PersonRegistry,
    PersonSearchCriteria, Sex, TreeCache, Viewport,
};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "lineage")]
#[command(about = "Civil-registry ancestry trees", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage person records
    Person {
        #[command(subcommand)]
        command: PersonCommands,
    },
    /// Load the sample family into an empty registry
    Seed,
    /// Show the ancestry tree of a person
    Tree {
        /// Principal's record ID
        id: String,
        /// Rebuild from the registry instead of using the stored tree
        #[arg(long)]
        rebuild: bool,
    },
    /// Print the tree graph as JSON
    Graph {
        /// Principal's record ID
        id: String,
    },
    /// Print positioned nodes as JSON
    Layout {
        /// Principal's record ID
        id: String,
        /// Layout mode (generational or hierarchical)
        #[arg(long)]
        mode: Option<LayoutMode>,
        /// Viewport width
        #[arg(long)]
        width: Option<f64>,
        /// Viewport height
        #[arg(long)]
        height: Option<f64>,
    },
    /// Print the default configuration
    Config,
    /// Serve the registry and trees over HTTP
    Serve {
        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(Subcommand)]
enum PersonCommands {
    /// Register a new person
    Add {
        /// National identification number (15 digits)
        #[arg(long)]
        nin: String,
        #[arg(long)]
        surname: String,
        #[arg(long)]
        given_name: String,
        #[arg(long, value_enum)]
        sex: SexArg,
        /// Birth date (YYYY-MM-DD)
        #[arg(long)]
        birth_date: Option<NaiveDate>,
        #[arg(long)]
        birth_place: Option<String>,
        #[arg(long)]
        father_nin: Option<String>,
        #[arg(long)]
        father_surname: Option<String>,
        #[arg(long)]
        mother_nin: Option<String>,
        #[arg(long)]
        mother_surname: Option<String>,
    },
    /// Edit a person; only the given fields change
    Edit {
        /// Record ID
        id: String,
        /// National identification number (15 digits)
        #[arg(long)]
        nin: Option<String>,
        #[arg(long)]
        surname: Option<String>,
        #[arg(long)]
        given_name: Option<String>,
        #[arg(long, value_enum)]
        sex: Option<SexArg>,
        /// Birth date (YYYY-MM-DD)
        #[arg(long)]
        birth_date: Option<NaiveDate>,
        #[arg(long)]
        birth_place: Option<String>,
        #[arg(long)]
        father_nin: Option<String>,
        #[arg(long)]
        father_surname: Option<String>,
        #[arg(long)]
        mother_nin: Option<String>,
        #[arg(long)]
        mother_surname: Option<String>,
    },
    /// List all persons
    List,
    /// Show one person
    Show {
        /// Record ID
        id: String,
    },
    /// Search persons; every given filter must match
    Search {
        #[arg(long)]
        surname: Option<String>,
        #[arg(long)]
        given_name: Option<String>,
        #[arg(long)]
        nin: Option<String>,
        #[arg(long)]
        father_surname: Option<String>,
        #[arg(long)]
        mother_surname: Option<String>,
    },
    /// Delete a person
    Delete {
        /// Record ID
        id: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SexArg {
    M,
    F,
}

impl From<SexArg> for Sex {
    fn from(arg: SexArg) -> Self {
        match arg {
            SexArg::M => Sex::Male,
            SexArg::F => Sex::Female,
        }
    }
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so JSON output stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lineage=info,lineage_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> CliResult {
    if let Commands::Config = cli.command {
        print!("{}", Config::default_config_string());
        return Ok(());
    }

    let config = Config::load()?;

    match cli.command {
        Commands::Person { command } => run_person(command, &config),
        Commands::Seed => {
            let registry = PersonRegistry::new(storage(&config));
            match registry.seed_if_empty()? {
                0 => println!("Registry is not empty, nothing seeded."),
                n => println!("Seeded {} persons. Try 'lineage tree 1'.", n),
            }
            Ok(())
        }
        Commands::Tree { id, rebuild } => {
            let cache = cache(&config);
            let tree = if rebuild {
                cache.rebuild(&id)?
            } else {
                cache.get_or_build(&id)?
            };
            print_tree(&tree);
            Ok(())
        }
        Commands::Graph { id } => {
            let graph = cache(&config).graph(&id)?;
            println!("{}", serde_json::to_string_pretty(&graph)?);
            Ok(())
        }
        Commands::Layout {
            id,
            mode,
            width,
            height,
        } => {
            let viewport = Viewport::new(
                width.unwrap_or(config.layout.view_width),
                height.unwrap_or(config.layout.view_height),
            );
            let positioned = cache(&config).layout(&id, mode, Some(viewport))?;
            println!("{}", serde_json::to_string_pretty(&positioned)?);
            Ok(())
        }
        Commands::Serve { port } => {
            let serve_config = serve::ServeConfig {
                port: port.unwrap_or(config.server.port),
                config,
            };
            serve::start_server(serve_config).await
        }
        Commands::Config => Ok(()),
    }
}

fn run_person(command: PersonCommands, config: &Config) -> CliResult {
    let registry = PersonRegistry::new(storage(config));

    match command {
        PersonCommands::Add {
            nin,
            surname,
            given_name,
            sex,
            birth_date,
            birth_place,
            father_nin,
            father_surname,
            mother_nin,
            mother_surname,
        } => {
            let mut new = NewPerson::new(nin, surname, given_name, sex.into());
            new.birth_date = birth_date;
            new.birth_place = birth_place;
            new.father_nin = father_nin;
            new.father_surname = father_surname;
            new.mother_nin = mother_nin;
            new.mother_surname = mother_surname;

            let person = registry.create(new)?;
            println!("Registered {}", person.full_name());
            println!("  ID: {}", person.id);
            println!("  NIN: {}", format_nin(&person.nin));
        }
        PersonCommands::Edit {
            id,
            nin,
            surname,
            given_name,
            sex,
            birth_date,
            birth_place,
            father_nin,
            father_surname,
            mother_nin,
            mother_surname,
        } => {
            let mut person = registry.get(&id)?;
            if let Some(nin) = nin {
                person.nin = nin;
            }
            if let Some(surname) = surname {
                person.surname = surname;
            }
            if let Some(given_name) = given_name {
                person.given_name = given_name;
            }
            if let Some(sex) = sex {
                person.sex = sex.into();
            }
            person.birth_date = birth_date.or(person.birth_date);
            person.birth_place = birth_place.or(person.birth_place);
            person.father_nin = father_nin.or(person.father_nin);
            person.father_surname = father_surname.or(person.father_surname);
            person.mother_nin = mother_nin.or(person.mother_nin);
            person.mother_surname = mother_surname.or(person.mother_surname);

            let person = registry.update(person)?;
            println!("Updated {}", person.full_name());
            if let Some(tree) = cache(config).sync_principal(person)? {
                println!("  Tree refreshed ({} members)", tree.len());
            }
        }
        PersonCommands::List => {
            let persons = registry.list()?;
            if persons.is_empty() {
                println!("No persons registered. Use 'lineage seed' or 'lineage person add'.");
            }
            for person in &persons {
                print_person_line(person);
            }
        }
        PersonCommands::Show { id } => {
            let person = registry.get(&id)?;
            print_person(&person);
        }
        PersonCommands::Search {
            surname,
            given_name,
            nin,
            father_surname,
            mother_surname,
        } => {
            let criteria = PersonSearchCriteria {
                surname,
                given_name,
                nin,
                father_surname,
                mother_surname,
            };
            let found = registry.search(&criteria)?;
            println!("{} match(es)", found.len());
            for person in &found {
                print_person_line(person);
            }
        }
        PersonCommands::Delete { id } => {
            let person = registry.get(&id)?;
            registry.delete(&id)?;
            // their own tree is meaningless without them
            cache(config).invalidate(&id)?;
            println!("Deleted {}", person.full_name());
        }
    }

    Ok(())
}

fn storage(config: &Config) -> FileStorage {
    FileStorage::with_config(config.storage.clone())
}

fn cache(config: &Config) -> TreeCache<FileStorage> {
    TreeCache::with_layout_config(storage(config), config.layout.clone())
}

fn print_person_line(person: &Person) {
    println!(
        "{:>8}  {}  {}  {}",
        truncate_id(&person.id),
        format_nin(&person.nin),
        person.sex,
        person.full_name()
    );
}

fn print_person(person: &Person) {
    println!("{}", person.full_name());
    println!("  ID: {}", person.id);
    println!("  NIN: {}", format_nin(&person.nin));
    println!("  Sex: {}", person.sex);
    if let Some(date) = person.birth_date {
        println!("  Born: {}", date);
    }
    if let Some(place) = &person.birth_place {
        println!("  Birth place: {}", place);
    }
    let father = parent_summary(person.father_surname.as_deref(), person.father_ref());
    let mother = parent_summary(person.mother_surname.as_deref(), person.mother_ref());
    println!("  Father: {}", father);
    println!("  Mother: {}", mother);
}

fn parent_summary(surname: Option<&str>, nin: Option<&str>) -> String {
    match (surname, nin) {
        (Some(s), Some(n)) => format!("{} ({})", s, format_nin(n)),
        (None, Some(n)) => format_nin(n),
        (Some(s), None) => s.to_string(),
        (None, None) => "-".to_string(),
    }
}

fn print_tree(tree: &AncestryTree) {
    println!(
        "Ancestry of {} ({} members, built {})",
        tree.principal.full_name(),
        tree.len(),
        tree.built_at.format("%Y-%m-%d %H:%M")
    );

    for generation in 0..=MAX_GENERATION {
        let members: Vec<_> = tree.generation(generation).collect();
        if members.is_empty() {
            continue;
        }
        println!("\nGeneration {}", generation);
        for member in members {
            println!(
                "  {:<26} {}  {}",
                member.relation.display_name(),
                format_nin(&member.person.nin),
                member.person.full_name()
            );
        }
    }
}

fn truncate_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}
