//! Compose templates for each catalog entry.

use super::catalog::RenderContext;
use super::compose::{ComposeFile, ComposeService, DependsCondition, HealthCheck};
use crate::error::Result;

pub const PIHOLE_PASSWORD: &str = "PIHOLE_PASSWORD";
pub const VAULTWARDEN_ADMIN_TOKEN: &str = "VAULTWARDEN_ADMIN_TOKEN";
pub const PASSBOLT_DB_PASSWORD: &str = "PASSBOLT_DB_PASSWORD";
pub const GRAFANA_ADMIN_PASSWORD: &str = "GRAFANA_ADMIN_PASSWORD";
pub const WIKIJS_DB_PASSWORD: &str = "WIKIJS_DB_PASSWORD";

pub fn portainer(ctx: &RenderContext) -> ComposeFile {
    ComposeFile::default()
        .service(
            "portainer",
            ComposeService::new("portainer/portainer-ce:latest", "portainer")
                .env("TZ", &ctx.host.timezone)
                .port("8000:8000")
                .port("9443:9443")
                .mount("/var/run/docker.sock:/var/run/docker.sock")
                .mount("portainer_data:/data"),
        )
        .volume("portainer_data")
}

pub fn pihole(name: &str, ctx: &RenderContext) -> Result<ComposeFile> {
    let password = ctx.secrets.require(name, PIHOLE_PASSWORD)?;

    Ok(ComposeFile::default()
        .service(
            "pihole",
            ComposeService::new("pihole/pihole:latest", "pihole")
                .env("TZ", &ctx.host.timezone)
                .env("FTLCONF_webserver_api_password", password)
                .env("FTLCONF_dns_listeningMode", "all")
                .port("53:53/tcp")
                .port("53:53/udp")
                .port("8080:80/tcp")
                .mount("pihole_etc:/etc/pihole")
                .mount("pihole_dnsmasq:/etc/dnsmasq.d")
                .cap("NET_ADMIN")
                .cap("SYS_NICE"),
        )
        .volume("pihole_etc")
        .volume("pihole_dnsmasq"))
}

pub fn adguard(ctx: &RenderContext) -> ComposeFile {
    ComposeFile::default()
        .service(
            "adguard",
            ComposeService::new("adguard/adguardhome:latest", "adguard")
                .env("TZ", &ctx.host.timezone)
                .port("53:53/tcp")
                .port("53:53/udp")
                .port("3000:3000/tcp")
                .port("8081:80/tcp")
                .mount("adguard_work:/opt/adguardhome/work")
                .mount("adguard_conf:/opt/adguardhome/conf"),
        )
        .volume("adguard_work")
        .volume("adguard_conf")
}

pub fn vaultwarden(name: &str, ctx: &RenderContext) -> Result<ComposeFile> {
    let token = ctx.secrets.require(name, VAULTWARDEN_ADMIN_TOKEN)?;
    let cert_mount = format!("{}:/ssl:ro", ctx.cert_dir.display());

    Ok(ComposeFile::default()
        .service(
            "vaultwarden",
            ComposeService::new("vaultwarden/server:latest", "vaultwarden")
                .env("TZ", &ctx.host.timezone)
                .env("DOMAIN", format!("https://{}:8443", ctx.host.ip))
                .env("ADMIN_TOKEN", token)
                .env("SIGNUPS_ALLOWED", "true")
                .env("ROCKET_PORT", "443")
                .env(
                    "ROCKET_TLS",
                    r#"{certs="/ssl/cert.pem",key="/ssl/key.pem"}"#,
                )
                .port("8443:443")
                .mount("vaultwarden_data:/data")
                .mount(cert_mount),
        )
        .volume("vaultwarden_data"))
}

pub fn passbolt(name: &str, ctx: &RenderContext) -> Result<ComposeFile> {
    let db_password = ctx.secrets.require(name, PASSBOLT_DB_PASSWORD)?;

    let db = ComposeService::new("mariadb:10.11", "passbolt-db")
        .env("TZ", &ctx.host.timezone)
        .env("MYSQL_RANDOM_ROOT_PASSWORD", "true")
        .env("MYSQL_DATABASE", "passbolt")
        .env("MYSQL_USER", "passbolt")
        .env("MYSQL_PASSWORD", db_password)
        .mount("passbolt_db:/var/lib/mysql")
        .on_network("passbolt_net")
        .healthcheck(HealthCheck::shell(
            "healthcheck.sh --connect --innodb_initialized",
            "10s",
            "5s",
            5,
        ));

    let app = ComposeService::new("passbolt/passbolt:latest-ce", "passbolt")
        .env("TZ", &ctx.host.timezone)
        .env("APP_FULL_BASE_URL", format!("https://{}:4433", ctx.host.ip))
        .env("DATASOURCES_DEFAULT_HOST", "passbolt-db")
        .env("DATASOURCES_DEFAULT_USERNAME", "passbolt")
        .env("DATASOURCES_DEFAULT_PASSWORD", db_password)
        .env("DATASOURCES_DEFAULT_DATABASE", "passbolt")
        .command([
            "/usr/bin/wait-for.sh",
            "-t",
            "0",
            "passbolt-db:3306",
            "--",
            "/docker-entrypoint.sh",
        ])
        .port("8082:80")
        .port("4433:443")
        .mount("passbolt_gpg:/etc/passbolt/gpg")
        .mount("passbolt_jwt:/etc/passbolt/jwt")
        .on_network("passbolt_net")
        .depends_on("db", DependsCondition::ServiceHealthy);

    Ok(ComposeFile::default()
        .service("db", db)
        .service("passbolt", app)
        .volume("passbolt_db")
        .volume("passbolt_gpg")
        .volume("passbolt_jwt")
        .network("passbolt_net"))
}

pub fn uptime_kuma(ctx: &RenderContext) -> ComposeFile {
    ComposeFile::default()
        .service(
            "uptime-kuma",
            ComposeService::new("louislam/uptime-kuma:1", "uptime-kuma")
                .env("TZ", &ctx.host.timezone)
                .port("3001:3001")
                .mount("uptime_kuma_data:/app/data"),
        )
        .volume("uptime_kuma_data")
}

pub fn monitoring(name: &str, ctx: &RenderContext) -> Result<ComposeFile> {
    let admin_password = ctx.secrets.require(name, GRAFANA_ADMIN_PASSWORD)?;

    let prometheus = ComposeService::new("prom/prometheus:latest", "monitoring-prometheus")
        .env("TZ", &ctx.host.timezone)
        .port("9090:9090")
        .mount("prometheus_data:/prometheus")
        .on_network("monitoring_net");

    let node_exporter =
        ComposeService::new("prom/node-exporter:latest", "monitoring-node-exporter")
            .command(["--path.rootfs=/host"])
            .port("9100:9100")
            .mount("/:/host:ro,rslave")
            .on_network("monitoring_net");

    let grafana = ComposeService::new("grafana/grafana-oss:latest", "monitoring-grafana")
        .env("TZ", &ctx.host.timezone)
        .env("GF_SECURITY_ADMIN_USER", "admin")
        .env("GF_SECURITY_ADMIN_PASSWORD", admin_password)
        .port("3002:3000")
        .mount("grafana_data:/var/lib/grafana")
        .on_network("monitoring_net")
        .healthcheck(HealthCheck::shell(
            "wget -q --spider http://localhost:3000/api/health || exit 1",
            "30s",
            "10s",
            3,
        ))
        .depends_on("prometheus", DependsCondition::ServiceStarted);

    Ok(ComposeFile::default()
        .service("prometheus", prometheus)
        .service("node-exporter", node_exporter)
        .service("grafana", grafana)
        .volume("prometheus_data")
        .volume("grafana_data")
        .network("monitoring_net"))
}

pub fn wikijs(name: &str, ctx: &RenderContext) -> Result<ComposeFile> {
    let db_password = ctx.secrets.require(name, WIKIJS_DB_PASSWORD)?;

    let db = ComposeService::new("postgres:15-alpine", "wikijs-db")
        .env("TZ", &ctx.host.timezone)
        .env("POSTGRES_DB", "wiki")
        .env("POSTGRES_USER", "wikijs")
        .env("POSTGRES_PASSWORD", db_password)
        .mount("wikijs_db:/var/lib/postgresql/data")
        .on_network("wikijs_net")
        .healthcheck(HealthCheck::shell(
            "pg_isready -U wikijs -d wiki",
            "10s",
            "5s",
            5,
        ));

    let wiki = ComposeService::new("ghcr.io/requarks/wiki:2", "wikijs")
        .env("TZ", &ctx.host.timezone)
        .env("DB_TYPE", "postgres")
        .env("DB_HOST", "wikijs-db")
        .env("DB_PORT", "5432")
        .env("DB_USER", "wikijs")
        .env("DB_PASS", db_password)
        .env("DB_NAME", "wiki")
        .port("8083:3000")
        .on_network("wikijs_net")
        .depends_on("db", DependsCondition::ServiceHealthy);

    Ok(ComposeFile::default()
        .service("db", db)
        .service("wiki", wiki)
        .volume("wikijs_db")
        .network("wikijs_net"))
}
