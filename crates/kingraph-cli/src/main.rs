use futures::executor::block_on;
use kingraph::{
    DirectoryCache, DirectoryRemote, FamilyGraph, GlobalRelation, GraphEdge, GraphNode,
    GraphViewController, LayoutOrigin, MemoryCache, NoRemote, Person, Position, PositionSource,
    PositionStore, RelationIndex, Resolution, SaveError, Selection, StoreError, ViewOptions,
    build_graph, compute_layout, layout_key,
};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Input(kingraph::Error),
    Json(serde_json::Error),
    Store(StoreError),
    Save(SaveError),
    UnknownNode(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Input(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::Store(err) => write!(f, "{err}"),
            CliError::Save(err) => write!(f, "Save failed: {err}"),
            CliError::UnknownNode(id) => write!(f, "No node with id `{id}`"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<kingraph::Error> for CliError {
    fn from(value: kingraph::Error) -> Self {
        Self::Input(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<StoreError> for CliError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<SaveError> for CliError {
    fn from(value: SaveError) -> Self {
        Self::Save(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Graph,
    Layout,
    Save,
    Clear,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    family_id: Option<i64>,
    store: Option<PathBuf>,
    config: Option<PathBuf>,
    relations: Option<PathBuf>,
    me: Option<String>,
    moves: Vec<(String, Position)>,
    pretty: bool,
    no_stored: bool,
    verbosity: u8,
}

fn usage() -> &'static str {
    "kingraph-cli\n\
\n\
USAGE:\n\
  kingraph-cli [graph] [--config <file.json>] [--relations <file.json>] [--me <id>] [--pretty] [<persons.json>|-]\n\
  kingraph-cli layout [--family <id>] [--store <dir>] [--no-stored] [--config <file.json>] [--relations <file.json>] [--me <id>] [--pretty] [<persons.json>|-]\n\
  kingraph-cli save --store <dir> [--family <id>] [--move <id>=<x>,<y>]... [--no-stored] [--config <file.json>] [--pretty] [<persons.json>|-]\n\
  kingraph-cli clear --store <dir> [--family <id>] [<persons.json>|-]\n\
\n\
OPTIONS:\n\
  -v, -vv   log to stderr (debug, trace)\n\
\n\
NOTES:\n\
  - If <persons.json> is omitted or '-', input is read from stdin.\n\
  - graph prints nodes (at their auto-layout positions) and edges.\n\
  - layout merges stored positions from <dir>/remote (per family) and <dir>/cache (per layout key).\n\
  - save applies the --move drags to the merged view and saves it; without --family only the cache is written.\n\
  - clear deletes the cached layout; with --family no input is read.\n\
"
}

fn parse_move(text: &str) -> Option<(String, Position)> {
    let (id, xy) = text.split_once('=')?;
    let (x, y) = xy.split_once(',')?;
    let (x, y) = (x.trim().parse::<f64>().ok()?, y.trim().parse::<f64>().ok()?);
    if id.trim().is_empty() || !x.is_finite() || !y.is_finite() {
        return None;
    }
    Some((id.trim().to_string(), Position::new(x, y)))
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "graph" => args.command = Command::Graph,
            "layout" => args.command = Command::Layout,
            "save" => args.command = Command::Save,
            "clear" => args.command = Command::Clear,
            "--pretty" => args.pretty = true,
            "--no-stored" => args.no_stored = true,
            "-v" => args.verbosity = args.verbosity.max(1),
            "-vv" => args.verbosity = 2,
            "--family" => {
                let Some(id) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.family_id = Some(id.parse::<i64>().map_err(|_| CliError::Usage(usage()))?);
            }
            "--store" => {
                let Some(dir) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.store = Some(PathBuf::from(dir));
            }
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config = Some(PathBuf::from(path));
            }
            "--relations" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.relations = Some(PathBuf::from(path));
            }
            "--me" => {
                let Some(id) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.me = Some(id.clone());
            }
            "--move" => {
                let Some(drag) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.moves
                    .push(parse_move(drag).ok_or(CliError::Usage(usage()))?);
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(CliError::Usage(usage()));
            }
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    if matches!(args.command, Command::Save | Command::Clear) && args.store.is_none() {
        return Err(CliError::Usage(usage()));
    }
    if !matches!(args.command, Command::Save) && !args.moves.is_empty() {
        return Err(CliError::Usage(usage()));
    }

    Ok(args)
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => return,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn read_persons(input: Option<&str>) -> Result<Vec<Person>, CliError> {
    Ok(kingraph::parse_persons(&read_input(input)?)?)
}

fn read_options(path: Option<&Path>) -> Result<ViewOptions, CliError> {
    match path {
        None => Ok(ViewOptions::default()),
        Some(path) => Ok(ViewOptions::from_json(&std::fs::read_to_string(path)?)?),
    }
}

fn read_relations(path: Option<&Path>) -> Result<Option<Vec<GlobalRelation>>, CliError> {
    match path {
        None => Ok(None),
        Some(path) => Ok(Some(serde_json::from_str(&std::fs::read_to_string(path)?)?)),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

fn open_store(dir: Option<&Path>) -> PositionStore {
    match dir {
        Some(dir) => PositionStore::new(
            DirectoryRemote::new(dir.join("remote")),
            DirectoryCache::new(dir.join("cache")),
        ),
        None => PositionStore::new(NoRemote, MemoryCache::new()),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ViewOut<'a> {
    layout_key: &'a str,
    family_id: Option<i64>,
    source: &'static str,
    nodes: &'a [GraphNode],
    edges: &'a [GraphEdge],
}

fn source_name(source: Option<PositionSource>) -> &'static str {
    match source {
        None | Some(PositionSource::Computed) => "computed",
        Some(PositionSource::Stored(LayoutOrigin::Remote)) => "remote",
        Some(PositionSource::Stored(LayoutOrigin::Local)) => "local",
    }
}

fn settle_view(controller: &GraphViewController, args: &Args, persons: &[Person]) {
    let token = controller.rebuild(persons, args.family_id);
    if args.no_stored {
        controller.bypass_stored_positions(token);
        return;
    }
    if let Resolution::Stale = block_on(controller.resolve_stored_positions(token)) {
        tracing::warn!("stored positions arrived for a superseded view");
    }
}

fn write_view(controller: &GraphViewController, pretty: bool) -> Result<(), CliError> {
    let state = controller.current_state();
    let graph = state.graph.unwrap_or_default();
    let out = ViewOut {
        layout_key: state.layout_key.as_deref().unwrap_or_default(),
        family_id: state.family_id,
        source: source_name(state.source),
        nodes: &graph.nodes,
        edges: &graph.edges,
    };
    write_json(&out, pretty)
}

fn run(args: Args) -> Result<(), CliError> {
    let options = read_options(args.config.as_deref())?;
    let selection = Selection {
        me: args.me.clone(),
        ..Default::default()
    };

    match args.command {
        Command::Graph => {
            let persons = read_persons(args.input.as_deref())?;
            let mut index = RelationIndex::build(&persons);
            if let Some(relations) = read_relations(args.relations.as_deref())? {
                index.merge_global(&relations);
            }
            let mut graph: FamilyGraph = build_graph(&persons, &index, &selection);
            compute_layout(&graph, &options).apply_to(&mut graph);
            write_json(&graph, args.pretty)
        }
        Command::Layout | Command::Save => {
            let persons = read_persons(args.input.as_deref())?;
            let controller = GraphViewController::new(open_store(args.store.as_deref()), options);
            controller.set_global_relations(read_relations(args.relations.as_deref())?);
            controller.set_selection(selection);
            settle_view(&controller, &args, &persons);

            if let Command::Save = args.command {
                for (id, position) in &args.moves {
                    if !controller.move_node(id, *position) {
                        return Err(CliError::UnknownNode(id.clone()));
                    }
                }
                block_on(controller.save_current_layout())?;
            }
            write_view(&controller, args.pretty)
        }
        Command::Clear => {
            let key = match args.family_id {
                Some(family_id) => layout_key(Some(family_id), std::iter::empty()),
                None => {
                    let persons = read_persons(args.input.as_deref())?;
                    layout_key(None, persons.iter().filter_map(|p| p.id))
                }
            };
            open_store(args.store.as_deref()).clear_local(&key)?;
            println!("{key}");
            Ok(())
        }
    }
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };
    init_logging(args.verbosity);

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        std::iter::once("kingraph-cli")
            .chain(args.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn move_arguments_parse() {
        assert_eq!(
            parse_move("3=10,-2.5"),
            Some(("3".to_string(), Position::new(10.0, -2.5)))
        );
        assert_eq!(parse_move("3=10"), None);
        assert_eq!(parse_move("=1,2"), None);
        assert_eq!(parse_move("3=a,2"), None);
    }

    #[test]
    fn save_requires_a_store() {
        assert!(matches!(
            parse_args(&argv(&["save", "persons.json"])),
            Err(CliError::Usage(_))
        ));
        let args = parse_args(&argv(&[
            "save", "--store", "s", "--family", "4", "--move", "1=2,3", "-",
        ]))
        .unwrap();
        assert_eq!(args.family_id, Some(4));
        assert_eq!(args.input.as_deref(), Some("-"));
        assert_eq!(args.moves.len(), 1);
    }

    #[test]
    fn moves_are_only_accepted_by_save() {
        assert!(matches!(
            parse_args(&argv(&["layout", "--move", "1=2,3"])),
            Err(CliError::Usage(_))
        ));
    }
}
