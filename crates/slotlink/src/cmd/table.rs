use crate::cmd::{load_table, TableArgs};
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_table_config, OutputFormat};

pub fn run(args: TableArgs, format: OutputFormat) -> CliResult<i32> {
    let slots = load_table(args.table.as_ref())?;
    print_table_config(&slots, format);
    Ok(SUCCESS)
}
