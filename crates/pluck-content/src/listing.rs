//! HTML listing of a package's top-level files

/// Render the listing page for `package@version`
///
/// Each path loses its leading `/` and becomes a relative link, in the order
/// given. Names are written as-is, without HTML escaping.
pub fn render(package_name: &str, version: &str, paths: &[String]) -> String {
    let items = paths
        .iter()
        .map(|path| {
            let name = path.strip_prefix('/').unwrap_or(path);
            format!("<li><a href=\"{}\">{}</a></li>", name, name)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "<!DOCTYPE HTML>
<html>
<head>
<meta charset=\"utf-8\">
<title>pluck</title>
</head>
<body>
<h1>{}@{}</h1>
<hr>
<ul>
{}
</ul>
<hr>
</body>
</html>",
        package_name, version, items
    )
}
