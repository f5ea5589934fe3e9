#![cfg(unix)]
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for single-file operations driven through a
//! [`Repository`](dotfiles::repository::Repository).

mod common;

use common::TestContext;
use dotfiles::dotfile::State;
use dotfiles::error::ErrorKind;
use dotfiles::logging::BufferedLog;

// ---------------------------------------------------------------------------
// Round trip
// ---------------------------------------------------------------------------

#[test]
fn add_then_remove_restores_the_file() {
    let ctx = TestContext::new();
    let vimrc = ctx.write_home(".vimrc", "set number\n");
    let repo = ctx.repository(&[], true);
    let log = BufferedLog::new();

    let dotfile = repo.dotfile(&vimrc).unwrap();
    dotfile.add(&log, false).unwrap();
    assert_eq!(dotfile.state(), State::Ok);
    assert!(vimrc.symlink_metadata().unwrap().file_type().is_symlink());
    assert_eq!(
        std::fs::read_to_string(ctx.repo_path().join("vimrc")).unwrap(),
        "set number\n"
    );

    dotfile.remove(&log, false).unwrap();
    assert!(!vimrc.symlink_metadata().unwrap().file_type().is_symlink());
    assert_eq!(std::fs::read_to_string(&vimrc).unwrap(), "set number\n");
    assert!(!ctx.repo_path().join("vimrc").exists());
}

#[test]
fn add_nested_file_creates_parents_on_both_sides() {
    let ctx = TestContext::new();
    let init = ctx.write_home(".config/nvim/init.lua", "vim.o.nu = true");
    let repo = ctx.repository(&[], true);

    let dotfile = repo.dotfile(&init).unwrap();
    dotfile.add(&BufferedLog::new(), false).unwrap();

    assert_eq!(dotfile.target(), ctx.repo_path().join("config/nvim/init.lua"));
    assert_eq!(dotfile.state(), State::Ok);
}

#[test]
fn unlink_then_link_restores_the_link() {
    let ctx = TestContext::new();
    let bashrc = ctx.write_home(".bashrc", "export A=1");
    let repo = ctx.repository(&[], true);
    let log = BufferedLog::new();
    let dotfile = repo.dotfile(&bashrc).unwrap();
    dotfile.add(&log, false).unwrap();

    dotfile.unlink(&log, false).unwrap();
    assert_eq!(dotfile.state(), State::Missing);
    dotfile.link(&log, false).unwrap();
    assert_eq!(dotfile.state(), State::Ok);
}

// ---------------------------------------------------------------------------
// Repeated operations fail with a stable kind
// ---------------------------------------------------------------------------

#[test]
fn repeated_operations_are_rejected() {
    let ctx = TestContext::new();
    let gitconfig = ctx.write_home(".gitconfig", "[user]\n");
    let repo = ctx.repository(&[], true);
    let log = BufferedLog::new();
    let dotfile = repo.dotfile(&gitconfig).unwrap();

    dotfile.add(&log, false).unwrap();
    let err = dotfile.add(&log, false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IsSymlink);

    let err = dotfile.link(&log, false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Exists);

    dotfile.unlink(&log, false).unwrap();
    let err = dotfile.unlink(&log, false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotASymlink);

    dotfile.link(&log, false).unwrap();
    dotfile.remove(&log, false).unwrap();
    let err = dotfile.remove(&log, false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotASymlink);
}

#[test]
fn add_refuses_existing_target() {
    let ctx = TestContext::new();
    let zshrc = ctx.write_home(".zshrc", "local");
    ctx.write_repo("zshrc", "stored");
    let repo = ctx.repository(&[], true);

    let err = repo
        .dotfile(&zshrc)
        .unwrap()
        .add(&BufferedLog::new(), false)
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TargetExists);
    assert_eq!(std::fs::read_to_string(&zshrc).unwrap(), "local");
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

#[test]
fn resolution_rejects_paths_in_order() {
    let ctx = TestContext::new();
    let repo = ctx.repository(&["*.swp"], true);

    let outside = ctx.outside("elsewhere");
    assert_eq!(
        repo.dotfile(&outside).unwrap_err().kind(),
        ErrorKind::NotRootedInHome
    );
    let inside = ctx.write_repo("vimrc", "");
    assert_eq!(repo.dotfile(&inside).unwrap_err().kind(), ErrorKind::InRepository);
    let plain = ctx.write_home("notes.txt", "");
    assert_eq!(repo.dotfile(&plain).unwrap_err().kind(), ErrorKind::NotADotfile);
    let swap = ctx.write_home(".vimrc.swp", "");
    assert_eq!(repo.dotfile(&swap).unwrap_err().kind(), ErrorKind::TargetIgnored);
    std::fs::create_dir(ctx.home().join(".ssh")).unwrap();
    assert_eq!(
        repo.dotfile(&ctx.home().join(".ssh")).unwrap_err().kind(),
        ErrorKind::IsDirectory
    );
}

#[test]
fn dot_policy_inverts_the_mapping() {
    let ctx = TestContext::new();
    let vimrc = ctx.write_home(".vimrc", "");
    let script = ctx.write_home("bin/backup", "#!/bin/sh");

    let stripped = ctx.repository(&[], true);
    assert_eq!(
        stripped.dotfile(&vimrc).unwrap().target(),
        ctx.repo_path().join("vimrc")
    );
    assert_eq!(
        stripped.dotfile(&script).unwrap_err().kind(),
        ErrorKind::NotADotfile
    );

    let verbatim = ctx.repository(&[], false);
    assert_eq!(
        verbatim.dotfile(&vimrc).unwrap().target(),
        ctx.repo_path().join(".vimrc")
    );
    assert_eq!(
        verbatim.dotfile(&script).unwrap().target(),
        ctx.repo_path().join("bin/backup")
    );
}

// ---------------------------------------------------------------------------
// State matrix
// ---------------------------------------------------------------------------

#[test]
fn state_covers_every_arrangement() {
    let ctx = TestContext::new();
    let repo = ctx.repository(&[], true);
    let log = BufferedLog::new();

    ctx.write_repo("linked", "x");
    let linked = repo.dotfile(&ctx.home().join(".linked")).unwrap();
    linked.link(&log, false).unwrap();
    assert_eq!(linked.state(), State::Ok);

    ctx.write_repo("copied", "same");
    ctx.write_home(".copied", "same");
    assert_eq!(
        repo.dotfile(&ctx.home().join(".copied")).unwrap().state(),
        State::Copy
    );

    ctx.write_repo("differs", "one");
    ctx.write_home(".differs", "two");
    assert_eq!(
        repo.dotfile(&ctx.home().join(".differs")).unwrap().state(),
        State::Conflict
    );

    ctx.write_repo("absent", "x");
    assert_eq!(
        repo.dotfile(&ctx.home().join(".absent")).unwrap().state(),
        State::Missing
    );

    std::os::unix::fs::symlink("/usr/share/shared", ctx.repo_path().join("shared")).unwrap();
    assert_eq!(
        repo.dotfile(&ctx.home().join(".shared")).unwrap().state(),
        State::External
    );

    ctx.write_home(".untracked", "x");
    assert_eq!(
        repo.dotfile(&ctx.home().join(".untracked")).unwrap().state(),
        State::Error
    );
}
