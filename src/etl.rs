pub mod build_path;
pub mod categorize;
pub mod composite;
pub mod draw_map;
pub mod parse_osm;
pub mod project;

use log::{error, info};

use crate::errors::Result;

/// One stage of the map pipeline. Stages are plain values; whoever runs them
/// passes each stage's output on to the next.
pub trait Etl {
    type Input<'a>;
    type Output;

    fn etl_name(&self) -> &str;

    fn transform(&mut self, input: Self::Input<'_>) -> Result<Self::Output>;

    fn process(&mut self, input: Self::Input<'_>) -> Result<Self::Output> {
        info!(etl_name = self.etl_name(); "Starting ETL process");
        let output = match self.transform(input) {
            Ok(output) => Ok(output),
            Err(err) => {
                error!(etl_name = self.etl_name(), err = err.message.as_str(); "Transformation failed with error");
                Err(err)
            },
        }?;
        info!(etl_name = self.etl_name(); "Process finished");
        Ok(output)
    }
}
