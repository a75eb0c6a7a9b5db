//! 画廊与查看器 HTML 渲染。

use std::path::Path;

use crate::tree::{Entry, Tree, TreeError, join, relative_to};

const GALLERY_CSS: &str = "\
* { margin: 0; padding: 0; box-sizing: border-box; }
body { background: #111; color: #ddd; font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; }
.gallery { display: grid; grid-template-columns: repeat(auto-fill, minmax(200px, 1fr)); gap: 8px; padding: 8px; }
.tile { display: block; position: relative; text-decoration: none; color: inherit; }
.tile img { width: 100%; aspect-ratio: 1; object-fit: cover; display: block; background: #000; }
.label { position: absolute; left: 0; right: 0; bottom: 0; padding: 4px 6px; font-size: 13px; background: rgba(0, 0, 0, 0.6); overflow: hidden; text-overflow: ellipsis; white-space: nowrap; }";

const VIEWER_CSS: &str = "\
* { margin: 0; padding: 0; box-sizing: border-box; }
body { background: #000; overflow-y: hidden; }
.strip { display: flex; overflow-x: auto; scroll-snap-type: x mandatory; height: 100vh; }
.slide { flex: none; width: 100vw; height: 100vh; object-fit: contain; scroll-snap-align: center; }";

/// 画廊视图：目录的每个直接子项渲染为一块瓦片。
///
/// 文件子项直接以自身为缩略图；目录子项递归收集其全部后代文件，
/// 按路径字节序取第一个作缩略图并以数量作标签，没有任何文件的
/// 子目录整体省略。顶层顺序保持目录列举顺序，不再排序。
pub async fn gallery_page(tree: &Tree, dir: &Path) -> Result<String, TreeError> {
    let root = tree.root().to_string_lossy().into_owned();
    let dir_full = dir.to_string_lossy();
    let base_url = encode_path(relative_to(&root, &dir_full));
    let mut tiles = String::new();

    for child in tree.list_children(dir).await? {
        let name = child.path().file_name().unwrap_or_default().to_string_lossy();
        let url = html_escape(&join(&base_url, &urlencoding::encode(&name)));
        match &child {
            Entry::File(_) => {
                tiles.push_str(&format!(
                    "<a class=\"tile\" href=\"{url}\"><img src=\"{url}\" loading=\"lazy\"></a>\n"
                ));
            }
            Entry::Directory(path) => {
                let mut files = tree.walk(path).await?;
                if files.is_empty() {
                    continue;
                }
                files.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));

                let thumb_full = files[0].to_string_lossy();
                let thumb = html_escape(&encode_path(relative_to(&root, &thumb_full)));
                let label = html_escape(&name);
                let count = files.len();
                tiles.push_str(&format!(
                    "<a class=\"tile\" href=\"{url}\"><img src=\"{thumb}\" loading=\"lazy\"><span class=\"label\">{label}/ ({count})</span></a>\n"
                ));
            }
        }
    }

    Ok(page(&title_for(tree, dir), GALLERY_CSS, "gallery", &tiles))
}

/// 查看器视图：目录全部后代文件按路径字节序排成一条可滑动的图片带。
pub async fn viewer_page(tree: &Tree, dir: &Path) -> Result<String, TreeError> {
    let root = tree.root().to_string_lossy().into_owned();
    let mut files = tree.walk(dir).await?;
    files.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));

    let mut slides = String::new();
    for file in &files {
        let full = file.to_string_lossy();
        let src = html_escape(&encode_path(relative_to(&root, &full)));
        slides.push_str(&format!("<img class=\"slide\" src=\"{src}\">\n"));
    }

    Ok(page(&title_for(tree, dir), VIEWER_CSS, "strip", &slides))
}

fn title_for(tree: &Tree, dir: &Path) -> String {
    let root = tree.root().to_string_lossy().into_owned();
    let full = dir.to_string_lossy();
    let relative = relative_to(&root, &full);
    if relative.is_empty() {
        "swiv".to_string()
    } else {
        format!("swiv {}", html_escape(relative))
    }
}

fn page(title: &str, css: &str, class: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<style>
{css}
</style>
</head>
<body>
<main class="{class}">
{body}</main>
</body>
</html>
"#
    )
}

/// 逐段百分号编码 URL 路径，保留分隔符本身。
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment))
        .collect::<Vec<_>>()
        .join("/")
}

fn html_escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::{gallery_page, html_escape, viewer_page};
    use crate::tree::Tree;
    use tempfile::tempdir;

    fn make_tree() -> (tempfile::TempDir, Tree) {
        let temp = tempdir().expect("tempdir");
        let root = temp.path().join("root");
        std::fs::create_dir_all(&root).expect("create root");
        let root = std::fs::canonicalize(&root).expect("canonicalize root");
        (temp, Tree::new(root))
    }

    #[tokio::test]
    async fn gallery_renders_file_children_as_tiles() {
        let (_temp, tree) = make_tree();
        std::fs::write(tree.root().join("cat.png"), b"png").expect("write");

        let html = gallery_page(&tree, tree.root()).await.expect("render");
        assert!(html.contains(r#"<img src="/cat.png""#));
    }

    #[tokio::test]
    async fn gallery_omits_subdirectories_without_files() {
        let (_temp, tree) = make_tree();
        std::fs::create_dir_all(tree.root().join("empty/nested")).expect("mkdir");
        std::fs::create_dir(tree.root().join("full")).expect("mkdir");
        std::fs::write(tree.root().join("full/a.png"), b"a").expect("write");

        let html = gallery_page(&tree, tree.root()).await.expect("render");
        assert!(html.contains("full"));
        assert!(!html.contains("empty"));
    }

    #[tokio::test]
    async fn gallery_labels_directories_with_recursive_count_and_first_thumb() {
        let (_temp, tree) = make_tree();
        std::fs::create_dir_all(tree.root().join("trip/day2")).expect("mkdir");
        std::fs::write(tree.root().join("trip/b.png"), b"b").expect("write");
        std::fs::write(tree.root().join("trip/a.png"), b"a").expect("write");
        std::fs::write(tree.root().join("trip/day2/c.png"), b"c").expect("write");

        let html = gallery_page(&tree, tree.root()).await.expect("render");
        assert!(html.contains(r#"href="/trip""#));
        assert!(html.contains(r#"src="/trip/a.png""#));
        assert!(html.contains("trip/ (3)"));
    }

    #[tokio::test]
    async fn viewer_renders_all_descendants_in_pathname_order() {
        let (_temp, tree) = make_tree();
        std::fs::create_dir(tree.root().join("sub")).expect("mkdir");
        std::fs::write(tree.root().join("z.png"), b"z").expect("write");
        std::fs::write(tree.root().join("sub/a.png"), b"a").expect("write");

        let html = viewer_page(&tree, tree.root()).await.expect("render");
        assert_eq!(html.matches("<img class=\"slide\"").count(), 2);
        let first = html.find("/sub/a.png").expect("nested image");
        let second = html.find("/z.png").expect("top image");
        assert!(first < second);
    }

    #[tokio::test]
    async fn viewer_of_empty_tree_has_no_slides() {
        let (_temp, tree) = make_tree();
        let html = viewer_page(&tree, tree.root()).await.expect("render");
        assert_eq!(html.matches("<img").count(), 0);
    }

    #[tokio::test]
    async fn gallery_percent_encodes_reserved_link_characters() {
        let (_temp, tree) = make_tree();
        std::fs::write(tree.root().join("a b#c.png"), b"png").expect("write");

        let html = gallery_page(&tree, tree.root()).await.expect("render");
        assert!(html.contains(r#"src="/a%20b%23c.png""#));
        assert!(!html.contains("a b#c.png\""));
    }

    #[tokio::test]
    async fn viewer_percent_encodes_nested_slide_paths() {
        let (_temp, tree) = make_tree();
        std::fs::create_dir(tree.root().join("day 1")).expect("mkdir");
        std::fs::write(tree.root().join("day 1/x?.png"), b"png").expect("write");

        let html = viewer_page(&tree, tree.root()).await.expect("render");
        assert!(html.contains(r#"src="/day%201/x%3F.png""#));
    }

    #[test]
    fn escape_covers_html_metacharacters() {
        assert_eq!(
            html_escape(r#"<a & "b">"#),
            "&lt;a &amp; &quot;b&quot;&gt;"
        );
    }
}
