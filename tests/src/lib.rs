//! End-to-end tests for the NTL toolbox, run against loopback listeners and temporary files.

#[cfg(test)]
mod utils;

#[cfg(test)]
mod sweep {
    mod integration;
}

#[cfg(test)]
mod audit {
    mod integration;
}
