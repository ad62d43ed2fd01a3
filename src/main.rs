use std::io::{self, BufRead, Write};
use std::sync::Arc;

use venturelink::api::ApiClient;
use venturelink::config::Config;
use venturelink::lifecycle::Lifecycle;
use venturelink::models::{Decision, StartupDraft};
use venturelink::notify::{Kind, Notifier};
use venturelink::portfolio::Portfolio;
use venturelink::profile::Profiles;
use venturelink::session::{self, Role, RouteDecision, SessionContext};
use venturelink::views::auth::AuthView;
use venturelink::views::browse::BrowseView;
use venturelink::views::dashboard::{FounderDashboard, InvestorDashboard};
use venturelink::views::funding::FundingView;
use venturelink::views::layout;
use venturelink::views::profile::ProfileView;
use venturelink::views::saved::SavedView;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env();
    tracing::info!(base = %config.api_base, "starting venturelink client");

    let api = Arc::new(ApiClient::new(&config)?);
    let session = Arc::new(SessionContext::new());
    let notifier = Arc::new(Notifier::new());
    let lifecycle = Arc::new(Lifecycle::new(api.clone()));
    let portfolio = Arc::new(Portfolio::new(api.clone()));
    let profiles = Arc::new(Profiles::new(api.clone()));

    let auth = AuthView::new(api.clone(), session.clone(), notifier.clone());
    let browse = BrowseView::new(lifecycle.clone(), notifier.clone());
    let saved = SavedView::new(lifecycle.clone(), notifier.clone());
    let funding = FundingView::new(lifecycle.clone(), notifier.clone());
    let founder_home = FounderDashboard::new(portfolio.clone(), lifecycle.clone(), notifier.clone());
    let investor_home = InvestorDashboard::new(lifecycle.clone(), notifier.clone());
    let profile = ProfileView::new(profiles.clone(), notifier.clone());

    // Entering the shell is landing entry; any stale session is torn down.
    auth.enter_landing();
    println!("venturelink — type 'help' for commands");

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = stdin.lock().lines().next() else {
            break;
        };
        let line = line?;
        let args: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, rest)) = args.split_first() else {
            continue;
        };

        match command {
            "help" => print_help(),
            "quit" | "exit" => break,

            "signin" => match rest {
                [user, pass] => {
                    auth.sign_in(user, pass).await;
                }
                _ => usage("signin <username> <password>"),
            },
            "signup" => match rest {
                [user, pass, role] => match parse_role(role) {
                    Some(role) => {
                        auth.sign_up(user, pass, pass, role).await;
                    }
                    None => usage("signup <username> <password> <Founder|Investor>"),
                },
                _ => usage("signup <username> <password> <Founder|Investor>"),
            },
            "logout" => {
                if guarded(&session, &[]) {
                    auth.sign_out().await;
                }
            }

            "browse" => {
                if guarded(&session, &[Role::Investor]) {
                    browse.load().await;
                    println!("{}", layout::render_frame(&session.snapshot(), &browse.render()));
                }
            }
            "save" => {
                if guarded(&session, &[Role::Investor]) {
                    match parse_id(rest) {
                        Some(id) => browse.toggle_save(id).await,
                        None => usage("save <startup-id>"),
                    }
                }
            }
            "amount" => {
                if guarded(&session, &[Role::Investor]) {
                    match rest {
                        [id, value] => match id.parse() {
                            Ok(id) => browse.enter_amount(id, value),
                            Err(_) => usage("amount <startup-id> <value>"),
                        },
                        _ => usage("amount <startup-id> <value>"),
                    }
                }
            }
            "request" => {
                if guarded(&session, &[Role::Investor]) {
                    match parse_id(rest) {
                        Some(id) => browse.send_request(id).await,
                        None => usage("request <startup-id>"),
                    }
                }
            }
            "saved" => {
                if guarded(&session, &[Role::Investor]) {
                    saved.load().await;
                    println!("{}", layout::render_frame(&session.snapshot(), &saved.render()));
                }
            }
            "unsave" => {
                if guarded(&session, &[Role::Investor]) {
                    match parse_id(rest) {
                        Some(id) => saved.unsave(id).await,
                        None => usage("unsave <startup-id>"),
                    }
                }
            }
            "investments" => {
                if guarded(&session, &[Role::Investor]) {
                    investor_home.load().await;
                    println!(
                        "{}",
                        layout::render_frame(&session.snapshot(), &investor_home.render())
                    );
                }
            }

            "requests" => {
                if guarded(&session, &[Role::Founder]) {
                    funding.load().await;
                    println!("{}", layout::render_frame(&session.snapshot(), &funding.render()));
                }
            }
            "search" => {
                if guarded(&session, &[Role::Founder]) {
                    funding.set_query(rest.first().copied().unwrap_or(""));
                    println!("{}", layout::render_frame(&session.snapshot(), &funding.render()));
                }
            }
            "accept" => {
                if guarded(&session, &[Role::Founder]) {
                    match parse_id(rest) {
                        Some(id) => funding.decide(id, Decision::Accepted).await,
                        None => usage("accept <request-id>"),
                    }
                }
            }
            "reject" => {
                if guarded(&session, &[Role::Founder]) {
                    match parse_id(rest) {
                        Some(id) => funding.decide(id, Decision::Rejected).await,
                        None => usage("reject <request-id>"),
                    }
                }
            }
            "startups" => {
                if guarded(&session, &[Role::Founder]) {
                    if let Err(err) = portfolio.refresh().await {
                        println!("could not load startups: {err}");
                    }
                    let mut body = String::new();
                    for s in portfolio.startups() {
                        body.push_str(&format!(
                            "#{} {} — goal {} raised {}\n",
                            s.id,
                            s.name,
                            venturelink::views::format_inr(s.funding_goal),
                            venturelink::views::format_inr(s.raised()),
                        ));
                    }
                    if body.is_empty() {
                        body.push_str("No startups yet.\n");
                    }
                    println!("{}", layout::render_frame(&session.snapshot(), &body));
                }
            }
            "newstartup" => {
                if guarded(&session, &[Role::Founder]) {
                    match rest {
                        [name, goal] | [name, goal, _] => {
                            let draft = StartupDraft {
                                name: (*name).to_string(),
                                funding_goal: goal.parse().unwrap_or(0.0),
                                equity: rest.get(2).and_then(|e| e.parse().ok()),
                                ..StartupDraft::default()
                            };
                            match portfolio.create(&draft, None).await {
                                Ok(created) => println!("created #{} {}", created.id, created.name),
                                Err(err) => println!("create failed: {err}"),
                            }
                        }
                        _ => usage("newstartup <name> <goal> [equity-%]"),
                    }
                }
            }
            "delstartup" => {
                if guarded(&session, &[Role::Founder]) {
                    match parse_id(rest) {
                        Some(id) => match portfolio.delete(id).await {
                            Ok(()) => println!("deleted #{id}"),
                            Err(err) => println!("delete failed: {err}"),
                        },
                        None => usage("delstartup <startup-id>"),
                    }
                }
            }

            "profile" => match session.role() {
                Some(role) => {
                    profile.load(role).await;
                    println!(
                        "{}",
                        layout::render_frame(&session.snapshot(), &profile.render(role))
                    );
                }
                None => println!("sign in first"),
            },
            "editbio" => match session.role() {
                Some(role) => {
                    let bio = rest.join(" ");
                    match role {
                        Role::Founder => {
                            let mut record = profiles.founder().unwrap_or_default();
                            record.bio = bio;
                            profile.save_founder(&record).await;
                        }
                        Role::Investor => {
                            let mut record = profiles.investor().unwrap_or_default();
                            record.bio = bio;
                            profile.save_investor(&record).await;
                        }
                    }
                }
                None => println!("sign in first"),
            },

            "dashboard" => match session.role() {
                Some(Role::Founder) => {
                    founder_home.load().await;
                    println!(
                        "{}",
                        layout::render_frame(&session.snapshot(), &founder_home.render())
                    );
                }
                Some(Role::Investor) => {
                    investor_home.load().await;
                    println!(
                        "{}",
                        layout::render_frame(&session.snapshot(), &investor_home.render())
                    );
                }
                None => println!("sign in first"),
            },

            _ => println!("unknown command; try 'help'"),
        }

        // Toasts print once, then leave the stack.
        for note in notifier.active() {
            let kind = match note.kind {
                Kind::Success => "ok",
                Kind::Error => "error",
            };
            println!("  [{kind}] {}: {}", note.title, note.detail);
            notifier.dismiss(note.token);
        }
    }

    Ok(())
}

fn guarded(session: &SessionContext, allowed: &[Role]) -> bool {
    match session::route(&session.snapshot(), allowed) {
        RouteDecision::Render => true,
        RouteDecision::RedirectSignIn => {
            println!("sign in first");
            false
        }
        RouteDecision::RedirectLanding => {
            println!("not available for your role");
            false
        }
    }
}

fn parse_role(raw: &str) -> Option<Role> {
    match raw.to_ascii_lowercase().as_str() {
        "founder" => Some(Role::Founder),
        "investor" => Some(Role::Investor),
        _ => None,
    }
}

fn parse_id(rest: &[&str]) -> Option<i64> {
    rest.first().and_then(|raw| raw.parse().ok())
}

fn usage(hint: &str) {
    println!("usage: {hint}");
}

fn print_help() {
    println!(
        "\
commands:
  signin <user> <pass>          sign in
  signup <user> <pass> <role>   create an account (Founder|Investor)
  logout                        sign out
  dashboard                     role-aware home
  profile                       view your profile
  editbio <text>                update your profile bio
investor:
  browse                        list startups seeking funding
  save <id> / unsave <id>       toggle bookmark
  amount <id> <value>           buffer an amount for a startup
  request <id>                  submit the buffered funding request
  saved                         saved startups
  investments                   accepted investments
founder:
  requests                      incoming funding requests
  search <text>                 filter requests
  accept <id> / reject <id>     decide a pending request
  startups                      my startups
  newstartup <name> <goal> [eq] create a startup
  delstartup <id>               delete a startup
  quit"
    );
}
