//! Command-line shell around the solver: positions in on stdin, one per
//! line, solutions out on stdout as `{id} {seconds} {length} {solution}`.

use clap::{Parser, ValueEnum};
use sixview::coord::{Ecoord, EdgeCoord, Eo4, Eo8, Eo12, Ep1, Ep2, Ep3, Ep4};
use sixview::cube::Cube;
use sixview::cube6::Cube6;
use sixview::moveseq::Style;
use sixview::prune::Prune;
use sixview::solver::{Depth4, Solver};
use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Instant;

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Format {
    Moves,
    Singmaster,
    Speffz,
}

#[derive(Copy, Clone, ValueEnum)]
enum OutStyle {
    /// `U' R  F2`
    Human,
    /// `U3R1F2`
    Fixed,
}

/// Optimal half-turn metric Rubik's cube solver.
///
/// Input cubes are read from standard input, one per line. Solutions are
/// output in the order they are found unless --ordered is given. Each line
/// is `{sequence number} {seconds} {length} {solution}`.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Pruning coordinate variant (e.g. 308 = EP3 x EO8)
    #[arg(short, long, default_value_t = 308)]
    coord: u32,

    /// Input format
    #[arg(short, long, value_enum, default_value = "moves")]
    format: Format,

    /// Speffz corner/edge buffer stickers (implies --format speffz)
    #[arg(short = 'z', long, value_name = "CE", num_args = 0..=1, default_missing_value = "")]
    speffz: Option<String>,

    /// Load or generate tables, then exit
    #[arg(short, long)]
    no_input: bool,

    /// Output in the same order as input
    #[arg(short = 'O', long)]
    ordered: bool,

    /// Output style
    #[arg(short, long, value_enum, default_value = "human")]
    style: OutStyle,

    /// Worker count
    #[arg(short, long, default_value_t = default_workers())]
    workers: usize,

    /// Depth limit per cube
    #[arg(short, long, default_value_t = 20)]
    limit: u8,
}

fn default_workers() -> usize {
    std::thread::available_parallelism().map_or(1, usize::from)
}

struct Config {
    format: Format,
    style: Style,
    speffz_buffers: [char; 2],
    ordered: bool,
    no_input: bool,
    workers: usize,
    limit: u8,
    table_path: PathBuf,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut format = args.format;
    let mut speffz_buffers = ['A', 'U'];
    if let Some(bufs) = &args.speffz {
        format = Format::Speffz;
        let mut chars = bufs.chars();
        if let Some(c) = chars.next() {
            speffz_buffers[0] = c;
            if let Some(e) = chars.next() {
                speffz_buffers[1] = e;
            }
        }
    }

    let cf = Config {
        format,
        style: match args.style {
            OutStyle::Human => Style::Singmaster,
            OutStyle::Fixed => Style::Fixed,
        },
        speffz_buffers,
        ordered: args.ordered,
        no_input: args.no_input,
        workers: args.workers.max(1),
        limit: args.limit,
        table_path: table_path(args.coord),
    };

    let result = match args.coord {
        112 => run::<Ecoord<Ep1, Eo12>, 9>(&cf),
        208 => run::<Ecoord<Ep2, Eo8>, 9>(&cf),
        212 => run::<Ecoord<Ep2, Eo12>, 10>(&cf),
        304 => run::<Ecoord<Ep3, Eo4>, 8>(&cf),
        308 => run::<Ecoord<Ep3, Eo8>, 10>(&cf),
        312 => run::<Ecoord<Ep3, Eo12>, 10>(&cf),
        404 => run::<Ecoord<Ep4, Eo4>, 10>(&cf),
        other => {
            eprintln!("Unsupported edge coordinate '{other}'");
            eprintln!("Supported variants:");
            eprintln!("  112 ({:>6} MiB)", Prune::<Ecoord<Ep1, Eo12>, 9>::size() >> 20);
            eprintln!("  208 ({:>6} MiB)", Prune::<Ecoord<Ep2, Eo8>, 9>::size() >> 20);
            eprintln!("  212 ({:>6} MiB)", Prune::<Ecoord<Ep2, Eo12>, 10>::size() >> 20);
            eprintln!("  304 ({:>6} MiB)", Prune::<Ecoord<Ep3, Eo4>, 8>::size() >> 20);
            eprintln!("  308 ({:>6} MiB) [default]", Prune::<Ecoord<Ep3, Eo8>, 10>::size() >> 20);
            eprintln!("  312 ({:>6} MiB)", Prune::<Ecoord<Ep3, Eo12>, 10>::size() >> 20);
            eprintln!("  404 ({:>6} MiB)", Prune::<Ecoord<Ep4, Eo4>, 10>::size() >> 20);
            std::process::exit(1);
        }
    };

    if let Err(err) = result {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

/// Table files live next to the binary, named by variant.
fn table_path(coord: u32) -> PathBuf {
    let base = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(PathBuf::from))
        .unwrap_or_default();
    base.join(format!(
        "tables/nxprune_{}_{:02}.dat",
        coord / 100,
        coord % 100
    ))
}

fn parse_cube(cf: &Config, line: &str) -> Result<Cube, String> {
    match cf.format {
        Format::Moves => Ok(Cube::from_moves(line)),
        Format::Singmaster => Cube::from_singmaster(line).map_err(|e| e.to_string()),
        Format::Speffz => {
            Cube::from_speffz_buffers(line, cf.speffz_buffers[0], cf.speffz_buffers[1])
                .map_err(|e| e.to_string())
        }
    }
}

struct Output {
    slots: VecDeque<Option<String>>,
    head_id: u64,
}

impl Output {
    /// Print `line` for cube `id`, holding back out-of-order results when
    /// ordered output was requested.
    fn emit(&mut self, ordered: bool, id: u64, line: String) {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        if ordered {
            let slot = (id - self.head_id) as usize;
            self.slots[slot] = Some(line);
            while matches!(self.slots.front(), Some(Some(_))) {
                let line = self.slots.pop_front().unwrap().unwrap();
                self.head_id += 1;
                let _ = writeln!(out, "{line}");
            }
        } else {
            let _ = writeln!(out, "{line}");
        }
        let _ = out.flush();
    }
}

fn run<E: EdgeCoord + Sync, const BASE: u8>(cf: &Config) -> Result<(), String> {
    let prune: Prune<E, BASE> = match Prune::load(&cf.table_path) {
        Ok(p) => p,
        Err(err) => {
            log::info!("{err}; generating");
            let p = Prune::<E, BASE>::generate(cf.workers);
            p.save(&cf.table_path).map_err(|e| e.to_string())?;
            p
        }
    };

    if cf.no_input {
        return Ok(());
    }

    let seeds = Depth4::new();
    let total = Instant::now();

    let input = Mutex::new((BufReader::new(std::io::stdin()).lines(), 0u64));
    let output = Mutex::new(Output {
        slots: VecDeque::new(),
        head_id: 0,
    });

    std::thread::scope(|s| {
        for _ in 0..cf.workers {
            s.spawn(|| {
                let mut solver = Solver::new(&prune, &seeds);
                loop {
                    let (id, line) = {
                        let mut guard = input.lock().unwrap();
                        let Some(Ok(line)) = guard.0.next() else {
                            break;
                        };
                        let id = guard.1;
                        guard.1 += 1;
                        if cf.ordered {
                            output.lock().unwrap().slots.push_back(None);
                        }
                        (id, line)
                    };

                    let result = match parse_cube(cf, &line) {
                        Ok(cube) => {
                            let t0 = Instant::now();
                            let solved = solver.solve(&Cube6::new(cube), cf.limit);
                            let elapsed = t0.elapsed().as_secs_f64();
                            match solved {
                                Ok(moves) => {
                                    let canon = moves.canonical();
                                    format!(
                                        "{id} {elapsed:.9} {} {}",
                                        canon.len(),
                                        canon.to_string_style(cf.style)
                                    )
                                }
                                Err(err) => format!("{id} {elapsed:.9} - {err}"),
                            }
                        }
                        Err(err) => format!("{id} - - {err}"),
                    };

                    output.lock().unwrap().emit(cf.ordered, id, result);
                }
            });
        }
    });

    log::info!("total time: {:.3}s", total.elapsed().as_secs_f64());
    Ok(())
}
