//! `sgui` command line
//!
//! Inspects, validates and runs workspace files without the editor.

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use sgui_core::demo::{demo_registry, AddNumbers, DebugType, PlotDemo};
use sgui_core::{Workspace, WorkspaceConfig};
use sgui_engine::{Destinations, DrawingSurface, Host, RecordedSurface, Registry, SurfaceHandle};
use sgui_namespace::{EntryKind, NodePath};
use sgui_schema::{FieldMap, FieldValue, SchemaDescriptor};
use std::fmt::Write as _;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Prints notifications and console lines, keeps surfaces for a summary
#[derive(Debug, Default)]
struct TerminalHost {
    surfaces: RefCell<Vec<Rc<RefCell<RecordedSurface>>>>,
}

impl Host for TerminalHost {
    fn notify(&self, title: &str, body: &str) {
        println!("[{title}] {body}");
    }

    fn acquire_drawing_surface(&self, title: &str, is_3d: bool) -> SurfaceHandle {
        let surface = Rc::new(RefCell::new(RecordedSurface::new(title, is_3d)));
        self.surfaces.borrow_mut().push(Rc::clone(&surface));
        surface
    }

    fn console(&self, line: &str) {
        println!("{line}");
    }
}

impl TerminalHost {
    fn print_surfaces(&self) {
        for surface in self.surfaces.borrow().iter() {
            let surface = surface.borrow();
            let dims = if surface.is_3d() { "3D" } else { "2D" };
            println!("surface '{}' ({dims}): {} series", surface.title(), surface.series().len());
        }
    }
}

fn cli() -> Command {
    let file = || {
        Arg::new("file")
            .required(true)
            .value_parser(value_parser!(PathBuf))
            .help("Workspace file")
    };

    Command::new("sgui")
        .version(sgui_core::VERSION)
        .about("Inspect, validate and run SGUI workspace files")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .subcommand(
            Command::new("inspect")
                .about("Print the objects and functions of a workspace")
                .arg(file()),
        )
        .subcommand(
            Command::new("run")
                .about("Execute functions and report the results")
                .arg(file())
                .arg(
                    Arg::new("function")
                        .long("function")
                        .help("Run only this function"),
                )
                .arg(
                    Arg::new("save")
                        .long("save")
                        .action(ArgAction::SetTrue)
                        .help("Write produced objects back to the file"),
                ),
        )
        .subcommand(
            Command::new("validate")
                .about("Check every binding against its type and links")
                .arg(file()),
        )
        .subcommand(Command::new("types").about("List the registered object and function types"))
        .subcommand(
            Command::new("demo")
                .about("Write a workspace using the bundled demo plugins")
                .arg(file()),
        )
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let matches = cli().get_matches();
    if let Err(err) = dispatch(&matches) {
        error!("{err:#}");
        std::process::exit(1);
    }
}

fn dispatch(matches: &ArgMatches) -> Result<()> {
    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => WorkspaceConfig::from_file(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => WorkspaceConfig::default(),
    };
    let registry = Arc::new(demo_registry().context("registering demo plugins")?);
    let mut ws = Workspace::new(registry).with_config(config);

    match matches.subcommand() {
        Some(("inspect", args)) => {
            open(&mut ws, file_arg(args)?)?;
            inspect(&ws);
            Ok(())
        }
        Some(("run", args)) => {
            let path = file_arg(args)?;
            open(&mut ws, path)?;
            let host = TerminalHost::default();
            match args.get_one::<String>("function") {
                Some(name) => {
                    let function = NodePath::single(name.as_str())?;
                    ws.execute_function(&host, &function)?;
                }
                None => {
                    let report = ws.run_all(&host)?;
                    info!(completed = report.completed(), "run finished");
                }
            }
            host.print_surfaces();
            if args.get_flag("save") {
                let saved = ws.save()?;
                println!("saved {}", saved.display());
            }
            Ok(())
        }
        Some(("validate", args)) => {
            open(&mut ws, file_arg(args)?)?;
            let problems = ws.validate();
            for (path, err) in &problems {
                println!("{path}: {err}");
            }
            if problems.is_empty() {
                println!("ok");
                Ok(())
            } else {
                bail!("{} invalid binding(s)", problems.len())
            }
        }
        Some(("types", _)) => {
            print!("{}", describe_types(ws.registry()));
            Ok(())
        }
        Some(("demo", args)) => {
            let saved = write_demo(&mut ws, file_arg(args)?)?;
            println!("wrote {}", saved.display());
            Ok(())
        }
        _ => bail!("unknown command"),
    }
}

fn file_arg(args: &ArgMatches) -> Result<&Path> {
    args.get_one::<PathBuf>("file")
        .map(PathBuf::as_path)
        .context("missing workspace file")
}

fn open(ws: &mut Workspace, path: &Path) -> Result<()> {
    ws.open(path).with_context(|| format!("opening {}", path.display()))
}

fn inspect(ws: &Workspace) {
    println!("Objects:");
    for (path, kind) in ws.objects().entries() {
        let indent = "  ".repeat(path.len());
        let name = path.name().unwrap_or_default();
        match kind {
            EntryKind::Folder => println!("{indent}{name}\\"),
            EntryKind::Leaf => {
                let type_name = ws
                    .objects()
                    .binding(&path)
                    .ok()
                    .and_then(|b| ws.registry().object(b.schema_index()).ok())
                    .map_or("?", |entry| entry.type_name());
                println!("{indent}{name} ({type_name})");
            }
        }
    }

    println!("Functions:");
    for (path, binding) in ws.functions().leaves() {
        let type_name = ws
            .registry()
            .function(binding.schema_index())
            .map_or("?", |entry| entry.type_name());
        println!("  {} ({type_name})", path.name().unwrap_or_default());
        for (output, destination) in binding.outputs() {
            match destination {
                Some(destination) => println!("    {output} -> {destination}"),
                None => println!("    {output} -> (discarded)"),
            }
        }
    }
}

/// Registered types with their inputs, outputs, tips and help
fn describe_types(registry: &Registry) -> String {
    let mut out = String::from("Object types:\n");
    for (index, entry) in registry.object_types().enumerate() {
        describe_schema(&mut out, index, entry.type_name(), entry.schema());
    }
    out.push_str("Function types:\n");
    for (index, entry) in registry.function_types().enumerate() {
        describe_schema(&mut out, index, entry.type_name(), entry.schema());
    }
    out
}

fn describe_schema(out: &mut String, index: usize, type_name: &str, schema: &SchemaDescriptor) {
    // writing into a String cannot fail
    let _ = writeln!(out, "  [{index}] {type_name}");
    if let Some(help) = schema.help_text() {
        let _ = writeln!(out, "      {help}");
    }
    for (name, kind) in schema.inputs() {
        let _ = write!(out, "    in  {name}: {kind}");
        if let Some(tip) = schema.tip_for_input(name) {
            let _ = write!(out, "  ({tip})");
        }
        out.push('\n');
    }
    for (name, spec) in schema.outputs() {
        let _ = write!(out, "    out {name}: {spec}");
        if let Some(tip) = schema.tip_for_output(name) {
            let _ = write!(out, "  ({tip})");
        }
        out.push('\n');
    }
}

fn text(value: &str) -> FieldMap {
    let mut inputs = FieldMap::new();
    inputs.insert("Value".to_string(), FieldValue::text(value));
    inputs
}

fn write_demo(ws: &mut Workspace, path: &Path) -> Result<PathBuf> {
    let host = TerminalHost::default();
    let registry = ws.registry();
    let debug = registry.object_index(DebugType::NAME).context("Debug type missing")?;
    let add = registry.function_index(AddNumbers::NAME).context("AddNumbers type missing")?;
    let plot = registry.function_index(PlotDemo::NAME).context("Plot type missing")?;

    let x: NodePath = "\\Inputs\\X".parse()?;
    let y: NodePath = "\\Inputs\\Y".parse()?;
    ws.create_object(&host, &x, 0, text("5"))?;
    ws.create_object(&host, &y, 0, text("7"))?;

    let mut fields = FieldMap::new();
    fields.insert("rawvalue".into(), FieldValue::text("hello"));
    fields.insert("objectvalue".into(), FieldValue::path(x.clone()));
    fields.insert("filevalue".into(), FieldValue::text(""));
    fields.insert("dropdownvalue".into(), FieldValue::text("raw"));
    fields.insert("disabledvalue".into(), FieldValue::blank());
    fields.insert("functional".into(), FieldValue::path(y.clone()));
    fields.insert("list".into(), FieldValue::list([FieldValue::text("a"), FieldValue::text("b")]));
    let example: NodePath = "\\Examples\\Debug".parse()?;
    ws.create_object(&host, &example, debug, fields)?;

    let mut inputs = FieldMap::new();
    inputs.insert("Value 1".into(), FieldValue::path(x));
    inputs.insert("Value 2".into(), FieldValue::path(y));
    let mut outputs = Destinations::new();
    let z: NodePath = "\\Outputs\\Z".parse()?;
    outputs.insert("Result".into(), Some(z));
    ws.create_function(&host, &NodePath::single("Add")?, add, inputs, outputs)?;
    ws.create_function(&host, &NodePath::single("Plot")?, plot, FieldMap::new(), Destinations::new())?;

    Ok(ws.save_as(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn run_accepts_function_filter() {
        let matches = cli()
            .try_get_matches_from(["sgui", "--config", "c.toml", "run", "w.sgui", "--function", "Add"])
            .unwrap();
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "run");
        assert_eq!(args.get_one::<String>("function").map(String::as_str), Some("Add"));
        assert!(!args.get_flag("save"));
    }

    #[test]
    fn types_lists_tips_and_help() {
        let registry = demo_registry().unwrap();
        let listing = describe_types(&registry);

        assert!(listing.contains("[0] String"));
        assert!(listing.contains("[1] Debug"));
        assert!(listing.contains("in  Value 1: raw  (This is one value to add.)"));
        assert!(listing.contains("out Result: String  (This is the sum of Value 1 and Value 2.)"));
        assert!(listing.contains("Draws example line plots"));
        let functions = listing.split("Function types:").nth(1).unwrap();
        assert!(functions.contains("[0] AddNumbers"));
        assert!(functions.contains("[1] Plot"));
    }

    #[test]
    fn demo_file_validates_and_runs() {
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(demo_registry().unwrap());
        let mut ws = Workspace::new(Arc::clone(&registry));
        let saved = write_demo(&mut ws, &dir.path().join("demo")).unwrap();

        let mut reopened = Workspace::new(registry);
        reopened.open(&saved).unwrap();
        assert!(reopened.validate().is_empty());
        let host = TerminalHost::default();
        reopened.run_all(&host).unwrap();
        assert_eq!(host.surfaces.borrow().len(), 3);
    }
}
