use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use serde_json::json;

use srmap::{
    MapState, PlayerPosition, RegionStart, ReplayDecoder, ScriptedResolver, TerrainCatalog,
    TransitionResolver,
};

#[derive(Parser)]
#[command(name = "decode-replay")]
#[command(about = "Decode a replay recording into a tile-level terrain map")]
struct Args {
    /// Replay file
    replay: PathBuf,

    /// Sprite-category catalog (JSON map of terrain id to category label)
    #[arg(long)]
    catalog: PathBuf,

    /// Scripted region start "segment,x,y,region"; repeat per transition.
    /// When exhausted (or absent) the decoder prompts on stdin.
    #[arg(long = "transition", value_name = "S,X,Y,R")]
    transitions: Vec<String>,

    /// Answer remaining transitions interactively on stdin
    #[arg(long)]
    interactive: bool,

    /// Write the reconstructed map as JSON
    #[arg(long)]
    dump: Option<PathBuf>,
}

/// Scripted answers first, then (optionally) the operator on stdin — the
/// prompt takes the same "segment, x, y, region" line the original tool did.
struct CliResolver {
    scripted: ScriptedResolver,
    interactive: bool,
}

impl TransitionResolver for CliResolver {
    fn resolve(&mut self, last: Option<PlayerPosition>) -> Option<RegionStart> {
        if let Some(start) = self.scripted.resolve(last) {
            return Some(start);
        }
        if !self.interactive {
            return None;
        }
        if let Some(pos) = last {
            eprintln!("region transition at x:{} y:{}", pos.x, pos.y);
        } else {
            eprintln!("replay start");
        }
        loop {
            eprint!("enter segment, x, y, region (blank to stop): ");
            let _ = std::io::stderr().flush();
            let mut line = String::new();
            if std::io::stdin().read_line(&mut line).is_err() {
                return None;
            }
            let line = line.trim();
            if line.is_empty() {
                return None;
            }
            match parse_start(line) {
                Some(start) => return Some(start),
                None => eprintln!("could not parse {line:?}, expected e.g. 1, 25, 30, 5"),
            }
        }
    }
}

fn parse_start(s: &str) -> Option<RegionStart> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [segment, x, y, region] = parts.as_slice() else {
        return None;
    };
    Some(RegionStart {
        segment_id: segment.parse().ok()?,
        region_id: region.parse().ok()?,
        x: x.parse().ok()?,
        y: y.parse().ok()?,
    })
}

fn dump_map(map: &MapState) -> serde_json::Value {
    let regions: Vec<_> = map
        .regions()
        .map(|(_, region)| {
            let tiles: Vec<_> = region
                .tiles
                .iter()
                .filter_map(|&t| map.tile(t))
                .map(|tile| {
                    let components: Vec<_> = tile
                        .components
                        .iter()
                        .filter_map(|&c| map.component(c))
                        .map(|component| {
                            let terrain: Vec<_> = component
                                .rows
                                .iter()
                                .filter_map(|&r| map.row(r))
                                .map(|row| {
                                    json!({
                                        "id": row.terrain_id,
                                        "base": row.base.bits(),
                                        "wall": row.wall.bits(),
                                        "door": row.door.bits(),
                                    })
                                })
                                .collect();
                            json!({
                                "color": component.color.to_string(),
                                "terrain": terrain,
                            })
                        })
                        .collect();
                    json!({ "x": tile.x, "y": tile.y, "components": components })
                })
                .collect();
            json!({
                "segment": region.segment_id,
                "region": region.region_id,
                "name": region.name,
                "tiles": tiles,
            })
        })
        .collect();
    json!(regions)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let catalog = TerrainCatalog::load(&args.catalog)?;
    eprintln!("catalog: {} terrain ids", catalog.len());

    let data = std::fs::read(&args.replay)?;
    eprintln!("replay: {} bytes", data.len());

    let mut starts = Vec::new();
    for s in &args.transitions {
        let start = parse_start(s).ok_or_else(|| format!("bad --transition value {s:?}"))?;
        starts.push(start);
    }

    let mut map = MapState::new();
    let mut resolver = CliResolver {
        scripted: ScriptedResolver::new(starts),
        interactive: args.interactive,
    };
    let mut decoder = ReplayDecoder::new(&data, &mut map, &catalog, &mut resolver);
    let summary = decoder.run()?;

    println!(
        "moves: {}  transitions: {}  tiles: {}  end: {:?}",
        summary.moves, summary.transitions, summary.tiles, summary.end
    );
    println!(
        "regions: {}  tiles: {}  terrain rows: {}",
        map.region_count(),
        map.tile_count(),
        map.row_count()
    );

    if let Some(path) = &args.dump {
        let out = serde_json::to_string_pretty(&dump_map(&map))?;
        std::fs::write(path, out)?;
        eprintln!("map written to {}", path.display());
    }

    Ok(())
}
