//! Demo driver: builds a few formulas, prints their truth tables, and
//! optionally dumps a gate circuit as a Graphviz DOT file.

use clap::Parser;

use boolex::canonical;
use boolex::circuit::Circuit;
use boolex::expr::{eq, Expr, SymbolTable};

#[derive(Debug, Parser)]
#[command(name = "boolex", about = "Symbolic boolean algebra playground")]
struct Args {
    /// Write the half-adder circuit to this DOT file.
    #[arg(long)]
    dot: Option<std::path::PathBuf>,

    /// Unpack the circuit this many levels before writing it.
    #[arg(long, default_value_t = 0)]
    unpack: u32,

    /// Log level filter.
    #[arg(long, default_value = "info")]
    log: simplelog::LevelFilter,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    simplelog::TermLogger::init(
        args.log,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let st = SymbolTable::new();
    let p = st.var("p");
    let q = st.var("q");
    let r = st.var("r");

    let f = &(&p | &q) & &r;
    println!("f = {}", f);
    f.print_truth_table()?;
    println!();

    let g = f.subs_rel(&eq(&r, &Expr::from(true)))?.simplified();
    println!("f with r = 1 becomes {}", g);
    println!();

    let xor = canonical::xor(&st, "x", "y");
    println!("xor = {}", xor);
    xor.print_truth_table()?;
    println!();

    let mut circuit = Circuit::new();
    let adder = circuit.half_adder();
    println!(
        "half adder: {} NAND gates in {} parts",
        circuit.count_nand_gates(adder),
        circuit.parts(adder).len()
    );
    if args.unpack > 0 {
        circuit.unpack(adder, args.unpack);
        println!(
            "after unpack({}): {} parts",
            args.unpack,
            circuit.parts(adder).len()
        );
    }

    let a = circuit.in_port(adder, "a").expect("half adder input a");
    let b = circuit.in_port(adder, "b").expect("half adder input b");
    let sum = circuit.out_port(adder, "sum").expect("half adder sum");
    let carry = circuit.out_port(adder, "carry").expect("half adder carry");
    println!(" a | b | carry sum");
    for i in 0..4u64 {
        circuit.set_input_value(a, (i >> 1) & 1);
        circuit.set_input_value(b, i & 1);
        circuit.compute(adder);
        println!(
            " {} | {} |   {}    {}",
            (i >> 1) & 1,
            i & 1,
            circuit.bit(carry, 0) as u8,
            circuit.bit(sum, 0) as u8,
        );
    }

    if let Some(path) = args.dot {
        circuit.save_as_dot(adder, &path)?;
        println!("wrote {}", path.display());
    }

    Ok(())
}
