//! Deep Link Demo
//!
//! Registers a web endpoint, an app-scheme endpoint and a `mailto:` terminal,
//! then dispatches a batch of links and prints what each one resolved to.
//!
//! Run with `RUST_LOG=neuro_router=debug cargo run --example deeplink_demo`
//! to see the routing events.

use std::time::Instant;

use neuro_router::{
    preprocessor_fn, Branch, Endpoint, Handler, HookAction, Processor, Request, Router, Signal,
};

// ============================================================================
// Screens
// ============================================================================

#[derive(Debug)]
enum Screen {
    Home,
    Login,
    Message { id: u64, source: Option<String> },
    File(String),
    Compose { to: String, subject: Option<String> },
    NotSignedIn,
    Unknown(String),
}

struct Session {
    signed_in: bool,
}

fn build_router() -> Router<Screen> {
    let router = Router::new();

    router
        .register(
            Endpoint::routable("web")
                .schemes(["http", "https"])
                .host("www.mywebsite.com")
                .on_no_path(|_| Screen::Home)
                .on_other_path(|s| Screen::Unknown(s.url().to_string())),
            vec![
                Branch::new("/login", |_| Screen::Login),
                Branch::new("/messages/<id>", message),
            ],
        )
        .expect("web routes are valid");

    router
        .register(
            Endpoint::routable("app")
                .scheme("myapp")
                .on_process(|signal| {
                    let signed_in = signal.context::<Session>().is_some_and(|s| s.signed_in);
                    if signed_in {
                        HookAction::Continue
                    } else {
                        HookAction::halt(Screen::NotSignedIn)
                    }
                }),
            vec![
                Branch::new("/messages/<id>", message),
                Branch::new("/files/<path:.+>", |s| {
                    Screen::File(s.variable("path").unwrap_or_default().to_string())
                }),
            ],
        )
        .expect("app routes are valid");

    router
        .register_endpoint(
            Endpoint::terminal("mail", |s| Screen::Compose {
                to: s.url().trim_start_matches("mailto:").split('?').next().unwrap_or_default().to_string(),
                subject: s.query("subject").map(str::to_string),
            })
            .scheme("mailto"),
        )
        .expect("mail endpoint is valid");

    router
}

fn message(signal: &Signal) -> Screen {
    Screen::Message {
        id: signal.variables().get_as("id").unwrap_or_default(),
        source: signal.query("source").map(str::to_string),
    }
}

fn main() {
    env_logger::init();

    let router = build_router();
    router.set_preprocessor(preprocessor_fn(
        |processor: &dyn Processor<Screen>, handler: &Handler<Screen>, signal: &Signal| {
            let started = Instant::now();
            let screen = processor.process(handler, signal);
            println!("    handled {} in {:?}", signal.url(), started.elapsed());
            screen
        },
    ));

    let links = [
        ("https://www.mywebsite.com", false),
        ("https://www.mywebsite.com/login/", false),
        ("http://WWW.MYWEBSITE.COM/messages/42?source=push", false),
        ("https://www.mywebsite.com/does/not/exist", false),
        ("myapp://device/files/docs/report.pdf", true),
        ("myapp://device/messages/7", false),
        ("mailto:team@mywebsite.com?subject=Hello", false),
        ("ftp://unknown.host/file", false),
        ("not a url", false),
    ];

    for (link, signed_in) in links {
        println!("{link}");
        let request = Request::new(link).context(Session { signed_in });
        match router.proceed(request) {
            Ok(screen) => println!("  -> {screen:?}"),
            Err(err) => println!("  !! {err}"),
        }
    }

    if let Some(stats) = router.cache_stats() {
        println!(
            "cache: {} hits, {} misses, {} invalidations",
            stats.hits, stats.misses, stats.invalidations
        );
    }
}
