// This software is released under the MIT license.
// See file LICENSE for full license details.
use log::warn;

///////////////////////////////
/// Number of worker threads: as given, or all available cores
pub fn determine_thread_count(total: Option<usize>) -> anyhow::Result<usize> {
    if let Some(total) = total {
        if total == 0 {
            anyhow::bail!("Number of threads must be at least 1");
        }
        anyhow::Ok(total)
    } else {
        let total = std::thread::available_parallelism();
        if let Ok(total) = total {
            anyhow::Ok(total.get())
        } else {
            warn!("Could not autodetect the number of threads available. Setting to 1; use -@ to set it explicitly");
            anyhow::Ok(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_count() {
        assert_eq!(determine_thread_count(Some(3)).unwrap(), 3);
        assert!(determine_thread_count(Some(0)).is_err());
        assert!(determine_thread_count(None).unwrap() >= 1);
    }
}
