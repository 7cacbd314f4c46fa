use crate::{
    cli::args::{ChainArgs, CheckArgs, GraphvizArgs, ServeArgs},
    core::{transform_graph::lint, ConfigLoader, TransformGraph},
    server, Result,
};
use anyhow::{anyhow, Context};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

pub async fn serve(args: ServeArgs, settings: Option<&Path>) -> Result<i32> {
    let mut config = ConfigLoader::load(settings)?;
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(graph) = args.graph {
        config.transform.graph_file = Some(graph);
    }
    ConfigLoader::validate_config(&config)?;
    server::serve(config).await?;
    Ok(0)
}

pub fn chain(args: ChainArgs, settings: Option<&Path>) -> Result<i32> {
    let graph = load_graph(args.graph, settings)?;
    let chain = graph.get_transform_chain(&args.source_space, &args.target_space)?;
    if args.json {
        println!("{}", serde_json::to_string(&chain)?);
        return Ok(if chain.is_some() { 0 } else { 1 });
    }
    match chain {
        Some(chain) => {
            for transform in chain {
                println!("{}", transform);
            }
            Ok(0)
        }
        None => Err(anyhow!(
            "no transform chain from {:?} to {:?}",
            args.source_space,
            args.target_space
        )),
    }
}

pub fn graphviz(args: GraphvizArgs, settings: Option<&Path>) -> Result<i32> {
    let graph = load_graph(args.graph, settings)?;
    match args.output {
        Some(path) => {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            graph.export_graphviz(&mut writer)?;
            writer.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            graph.export_graphviz(&mut handle)?;
        }
    }
    Ok(0)
}

pub fn check(args: CheckArgs, settings: Option<&Path>) -> Result<i32> {
    let graph = load_graph(args.graph, settings)?;
    let report = lint::lint(&graph);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{} spaces, {} links", report.spaces, report.links);
        for (from, to) in &report.unreachable {
            println!("unreachable: {} -> {}", from, to);
        }
        for route in &report.ambiguous {
            println!(
                "ambiguous: {} -> {} ({} shortest chains)",
                route.from, route.to, route.shortest_chains
            );
        }
    }
    Ok(if report.is_fully_connected() { 0 } else { 1 })
}

fn load_graph(explicit: Option<PathBuf>, settings: Option<&Path>) -> Result<TransformGraph> {
    let path = match explicit {
        Some(path) => path,
        None => ConfigLoader::load(settings)?.transform.graph_path(),
    };
    TransformGraph::from_yaml_path(&path)
        .with_context(|| format!("failed to load transform graph {}", path.display()))
}
