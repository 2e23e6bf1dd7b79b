#![allow(dead_code)]

use std::path::Path;

use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

pub fn mkblog_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("mkblog"));
	cmd.env("NO_COLOR", "1");
	cmd.env_remove("RUST_LOG");
	cmd
}

/// Write `content` to `relative` under `root`, creating parent directories.
pub fn write(root: &Path, relative: &str, content: &str) -> std::io::Result<()> {
	let path = root.join(relative);
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent)?;
	}
	std::fs::write(path, content)
}

/// A blog with two valid posts and a `[schema]` requiring a title.
pub fn blog(root: &Path, extra_config: &str) -> std::io::Result<()> {
	write(
		root,
		"mkblog.toml",
		&format!("include = \"posts/*.md\"\n{extra_config}\n[schema]\ntitle = \"string\"\ntags = \"string[]?\"\n"),
	)?;
	write(
		root,
		"posts/hello.md",
		"---\ntitle: Hello\ntags: [intro]\n---\n\n# Hello\n\nSome *text*.\n\n## Details\n",
	)?;
	write(root, "posts/second.md", "---\ntitle: Second\n---\n\nSecond post.\n")
}
