mod dump;
mod style;

use log::info;
use std::{path::PathBuf, process};
use structopt::StructOpt;
use vm::{ClassTable, HeapPolicy, Interpreter, NativeTable, VmResult};

#[derive(Debug, StructOpt)]
#[structopt(name = "jvm-run", about = "Runs a method of a compiled class.")]
struct Options {
    /// Directory holding the `.class` files to load
    #[structopt(short = "c", long = "classpath", default_value = ".", parse(from_os_str))]
    classpath: PathBuf,

    /// Name of the method to run
    #[structopt(short = "m", long = "method", default_value = "main")]
    method: String,

    /// Let static calls see objects created by their callers
    #[structopt(long = "shared-heap")]
    shared_heap: bool,

    /// Print the class instead of running it
    #[structopt(long = "dump")]
    dump: bool,

    /// Fully qualified class name, such as `pkg/Main` or `pkg.Main`
    #[structopt(name = "CLASS")]
    class: String,
}

fn run(options: &Options) -> VmResult<()> {
    let class = options.class.replace('.', "/");
    let classes = ClassTable::load_dir(&options.classpath)?;
    info!(
        "{} classes loaded from {}",
        classes.len(),
        options.classpath.display()
    );

    if options.dump {
        print!("{}", dump::dump_class(classes.get(&class)?)?);
        return Ok(());
    }

    let heap_policy = if options.shared_heap {
        HeapPolicy::Shared
    } else {
        HeapPolicy::IsolateStatic
    };
    let interpreter =
        Interpreter::new(classes, NativeTable::with_defaults()).with_heap_policy(heap_policy);

    if let Some(value) = interpreter.run_method(&class, &options.method)? {
        info!("{}.{} returned {}", class, options.method, value);
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let options = Options::from_args();

    if let Err(err) = run(&options) {
        eprintln!("{} {}", style::get("error").paint("error:"), err);
        process::exit(1);
    }
}
