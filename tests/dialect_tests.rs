use servgen::preprocess::{Conditions, PlaceholderValue, Placeholders};
use servgen::{Compiler, Error};
use std::path::PathBuf;
use test_log::test;

fn repo_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(relative)
}

fn compiler(conditions: &[&str], port: i64) -> Compiler {
    let conditions: Conditions = conditions.iter().map(|c| c.to_string()).collect();
    let mut placeholders = Placeholders::new();
    placeholders.insert("PORT".to_string(), PlaceholderValue::Int(port));
    Compiler::new(conditions, placeholders)
}

fn compile_demo(compiler: &Compiler, dialect: &str) -> servgen::Result<String> {
    compiler.compile(repo_path("demos/site.conf"), repo_path(dialect))
}

#[test]
fn nginx_dialect_renders_demo_site() {
    let out = compile_demo(&compiler(&["tls"], 80), "dialects/nginx.conf.j2").unwrap();
    let expected = r#"# Generated by servgen (nginx dialect; tls)
http {
  server {
    server_name example.org;
    listen 80;
    ssl_protocols TLSv1.2 TLSv1.3;
    location /api {
      proxy_pass http://127.0.0.1:9000;
      add_header X-Frame-Options "DENY";
      add_header X-Served-By "api";
    }
    location /health {
      proxy_pass http://127.0.0.1:9100;
      add_header X-Frame-Options "DENY";
      add_header X-Served-By "api";
      add_header Cache-Control "no-store";
    }
  }
  server {
    server_name static.example.org;
    listen 8081;
    location /health {
      proxy_pass http://127.0.0.1:9100;
      add_header X-Frame-Options "DENY";
      add_header Cache-Control "no-store";
    }
  }
}
"#;
    assert_eq!(out, expected);
}

#[test]
fn apache_dialect_renders_demo_site() {
    let out = compile_demo(&compiler(&["gzip"], 8080), "dialects/apache.conf.j2").unwrap();
    let expected = r#"# Generated by servgen (apache dialect; gzip)
<VirtualHost *:8080>
  ServerName example.org
  <Location "/api">
    ProxyPass "http://127.0.0.1:9000"
    ProxyPassReverse "http://127.0.0.1:9000"
    Header always set X-Frame-Options "DENY"
    Header always set X-Served-By "api"
  </Location>
  <Location "/health">
    ProxyPass "http://127.0.0.1:9100"
    ProxyPassReverse "http://127.0.0.1:9100"
    Header always set X-Frame-Options "DENY"
    Header always set X-Served-By "api"
    Header always set Cache-Control "no-store"
  </Location>
</VirtualHost>
<VirtualHost *:8081>
  ServerName static.example.org
  SetOutputFilter DEFLATE
  <Location "/health">
    ProxyPass "http://127.0.0.1:9100"
    ProxyPassReverse "http://127.0.0.1:9100"
    Header always set X-Frame-Options "DENY"
    Header always set Cache-Control "no-store"
  </Location>
</VirtualHost>
"#;
    assert_eq!(out, expected);
}

#[test]
fn both_dialects_share_one_tree() {
    let compiler = compiler(&[], 80);
    let nginx = compile_demo(&compiler, "dialects/nginx.conf.j2").unwrap();
    let apache = compile_demo(&compiler, "dialects/apache.conf.j2").unwrap();

    assert!(nginx.starts_with("# Generated by servgen (nginx dialect)\n"));
    assert!(apache.starts_with("# Generated by servgen (apache dialect)\n"));
    assert!(!nginx.contains("ssl_protocols"));
    assert!(!apache.contains("SSLEngine"));
    assert_eq!(nginx.matches("server_name").count(), 2);
    assert_eq!(apache.matches("<VirtualHost").count(), 2);
}

#[test]
fn demo_site_requires_port_placeholder() {
    let compiler = Compiler::new(Conditions::new(), Placeholders::new());
    match compile_demo(&compiler, "dialects/nginx.conf.j2").unwrap_err() {
        Error::UndefinedPlaceholder { name, line } => {
            assert_eq!(name, "PORT");
            assert_eq!(line.get(), Some(5));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
