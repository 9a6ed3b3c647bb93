//! Entry point. Mirrors `main.c`'s `boot() + kernel() + shutDown()` shape:
//! each stage contributes an error code, and the sum becomes the process
//! exit code.

fn main() {
    env_logger::init();

    let mut error = 0i32;

    let mut kernel = match kernelsim::kernel::Kernel::boot() {
        Ok(k) => k,
        Err(e) => {
            eprintln!("Error: could not boot kernel: {}", e);
            std::process::exit(1);
        },
    };

    println!("Kernel loaded!");
    kernelsim::shell::run(&mut kernel);
    println!("Exiting kernel...");

    error += kernel.shutdown();

    std::process::exit(error);
}
