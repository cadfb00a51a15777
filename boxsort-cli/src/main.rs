mod application;
mod presentation;

use boxsort_core::error::Result;

fn main() -> Result<()> {
    application::run()
}
