//! End-to-end freezing of a small site

use blogfreeze::Blog;
use std::fs;
use std::path::Path;

fn write(root: &Path, name: &str, content: &str) {
    let path = root.join(name);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn sample_site() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    write(
        root,
        "settings.yml",
        "FREEZER_BASE_URL: https://blog.example.com\nSITE_TITLE: Frozen\n",
    );
    write(
        root,
        "posts/hello-world.markdown",
        "title: Hello World\ndate: 2013-01-01\npublished: true\n\n# Hi\n\nFirst post.\n",
    );
    write(
        root,
        "posts/2013/second.markdown",
        "title: Second\ndate: 2013-02-01\npublished: true\n\nSecond post.\n",
    );
    write(
        root,
        "posts/draft.markdown",
        "title: Not Yet\ndate: 2013-03-01\n\nUnfinished.\n",
    );
    write(root, "static/style.css", "body { margin: 0 }\n");

    dir
}

#[test]
fn freezes_published_posts_only() {
    let dir = sample_site();
    let blog = Blog::new(dir.path()).unwrap();

    let report = blog.build().unwrap();
    let build = dir.path().join("build");

    assert!(build.join("index.html").is_file());
    assert!(build.join("feed.atom").is_file());
    assert!(build.join("blog/hello-world/index.html").is_file());
    assert!(build.join("blog/2013/second/index.html").is_file());
    assert!(!build.join("blog/draft").exists());
    assert!(build.join("static/style.css").is_file());

    assert_eq!(report.assets, 1);
    let post_pages = report
        .routes
        .iter()
        .filter(|r| r.starts_with("/blog/"))
        .count();
    assert_eq!(post_pages, 2);

    let index = fs::read_to_string(build.join("index.html")).unwrap();
    assert!(index.find("Second").unwrap() < index.find("Hello World").unwrap());
    assert!(!index.contains("Not Yet"));

    let feed = fs::read_to_string(build.join("feed.atom")).unwrap();
    assert!(feed.contains("https://blog.example.com/blog/2013/second/"));
    assert!(!feed.contains("Not Yet"));
}

#[test]
fn refreezing_removes_stale_files() {
    let dir = sample_site();
    let blog = Blog::new(dir.path()).unwrap();
    blog.build().unwrap();

    fs::remove_file(dir.path().join("posts/hello-world.markdown")).unwrap();
    blog.build().unwrap();

    let build = dir.path().join("build");
    assert!(!build.join("blog/hello-world").exists());
    assert!(build.join("blog/2013/second/index.html").is_file());
}

#[test]
fn front_matter_keys_survive_loading() {
    let dir = sample_site();
    let blog = Blog::new(dir.path()).unwrap();

    let post = blog.loader().load("hello-world").unwrap().unwrap();
    let keys: Vec<_> = post.meta.keys().cloned().collect();
    assert_eq!(keys, vec!["title", "date", "published"]);
    assert_eq!(post.url(), "/blog/hello-world/");
    assert!(post.html().contains("<h1>Hi</h1>"));
}

#[test]
fn broken_post_aborts_the_build() {
    let dir = sample_site();
    write(dir.path(), "posts/broken.markdown", "title: [oops\n\nbody");

    let blog = Blog::new(dir.path()).unwrap();
    assert!(blog.build().is_err());
}

#[test]
fn destination_resolving_to_the_site_is_refused() {
    let dir = sample_site();
    write(
        dir.path(),
        "settings.yml",
        "FREEZER_DESTINATION: posts/..\n",
    );

    let blog = Blog::new(dir.path()).unwrap();
    assert!(blog.build().is_err());
    assert!(dir.path().join("posts/hello-world.markdown").is_file());
    assert!(dir.path().join("static/style.css").is_file());
}

#[test]
fn feed_entry_setting_is_capped() {
    let dir = sample_site();
    write(dir.path(), "settings.yml", "FEED_MAX_ENTRIES: 50\n");
    for day in 1..=15 {
        write(
            dir.path(),
            &format!("posts/bulk/{}.markdown", day),
            &format!("title: Bulk {}\ndate: 2014-01-{:02}\npublished: true\n\nbody\n", day, day),
        );
    }

    let site = Blog::new(dir.path()).unwrap().site().unwrap();
    let xml = site.render_feed("http://localhost/").unwrap();
    assert_eq!(xml.matches("<entry>").count(), 10);
}
