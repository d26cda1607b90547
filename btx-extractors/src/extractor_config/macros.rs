#[macro_export]
macro_rules! site_profile {
    (@opt) => {
        None
    };
    (@opt $value:expr) => {
        Some(String::from($value))
    };
    (
        name: $name:expr,
        domain: $domain:expr,
        hosts: [$($host:expr),* $(,)?],
        path: $path:expr,
        rank: $rank:expr,
        probe: $probe:expr,
        tags: $tags:expr,
        image: [$(($isel:expr, $iattr:expr)),* $(,)?],
        title: [$($title:expr),* $(,)?]
        $(, mirror: $mirror:expr)?
        $(, ignore: [$($ignore:expr),* $(,)?])?
        $(,)?
    ) => {
        $crate::extractor_config::ProfileSpec {
            name: String::from($name),
            domain: String::from($domain),
            hosts: vec![$(String::from($host)),*],
            path_pattern: Some(String::from($path)),
            rank: $rank,
            probe_url: Some(String::from($probe)),
            mirror_host: $crate::site_profile!(@opt $($mirror)?),
            tags: $tags,
            image: vec![$($crate::extractor_config::ImageSourceSpec::new($isel, $iattr)),*],
            title: vec![$($title),*],
            ignore: vec![$($(String::from($ignore)),*)?],
        }
    };
}
