pub use super::{App, AppError, CommonArgs, Config, Context, MainResult};

pub use structopt::StructOpt;
