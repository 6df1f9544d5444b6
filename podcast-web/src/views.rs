//! HTML views
//!
//! Plain markup from page props. Every string from the source is escaped
//! except the episode description, which is trusted HTML. Ids go into
//! double-quoted attributes through `encode_minimal`, which covers both
//! quote characters and keeps URL paths readable.

use htmlescape::{encode_attribute, encode_minimal};
use podcast_common::Episode;

use crate::pages::{EpisodePage, HomePage};

const SITE_NAME: &str = "Tec";

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="/static/player.js" defer></script>
</head>
<body>
<main>
{body}
</main>
<footer id="player" data-session=""><audio id="player-audio" controls></audio></footer>
</body>
</html>
"#,
        title = encode_minimal(title),
        body = body,
    )
}

fn episode_link(episode: &Episode) -> String {
    format!(
        r#"<a href="/episodes/{href}">{title}</a>"#,
        href = encode_minimal(&episode.id),
        title = encode_minimal(&episode.title),
    )
}

/// Play control for queue position `index`; the script rebuilds the queue
/// from the `data-episode` ids of all such buttons
fn play_list_button(index: usize, episode: &Episode) -> String {
    format!(
        r#"<button type="button" data-play-list="{index}" data-episode="{id}"><img src="/play-green.svg" alt="Tocar episodio"></button>"#,
        index = index,
        id = encode_minimal(&episode.id),
    )
}

/// `/`
pub fn home(page: &HomePage) -> String {
    let mut body = String::from("<section class=\"latestEpisodes\">\n<h2>Ultimos lancamentos</h2>\n<ul>\n");

    for (index, episode) in page.latest_episodes.iter().enumerate() {
        body.push_str(&format!(
            "<li>\n<img width=\"192\" height=\"192\" src=\"{thumb}\" alt=\"{alt}\">\n\
             <div class=\"episodeDetails\">{link}<p>{members}</p><span>{date}</span><span>{duration}</span></div>\n\
             {button}\n</li>\n",
            thumb = encode_attribute(&episode.thumbnail),
            alt = encode_attribute(&episode.title),
            link = episode_link(episode),
            members = encode_minimal(&episode.members),
            date = encode_minimal(&episode.published_at_display()),
            duration = episode.duration_as_string(),
            button = play_list_button(index, episode),
        ));
    }

    body.push_str(
        "</ul>\n</section>\n<section class=\"allEpisodes\">\n<h2>Todos episodios</h2>\n\
         <table cellspacing=\"0\">\n<thead><tr><th></th><th>Podcast</th><th>Integrantes</th>\
         <th>Data</th><th>Duracao</th><th></th></tr></thead>\n<tbody>\n",
    );

    let offset = page.all_episodes_offset();
    for (index, episode) in page.all_episodes.iter().enumerate() {
        body.push_str(&format!(
            "<tr>\n<td style=\"width: 72px\"><img width=\"120\" height=\"120\" src=\"{thumb}\" alt=\"{alt}\"></td>\n\
             <td>{link}</td>\n<td>{members}</td>\n<td style=\"width: 100px\">{date}</td>\n<td>{duration}</td>\n\
             <td>{button}</td>\n</tr>\n",
            thumb = encode_attribute(&episode.thumbnail),
            alt = encode_attribute(&episode.title),
            link = episode_link(episode),
            members = encode_minimal(&episode.members),
            date = encode_minimal(&episode.published_at_display()),
            duration = episode.duration_as_string(),
            button = play_list_button(index + offset, episode),
        ));
    }

    body.push_str("</tbody>\n</table>\n</section>");
    layout(&format!("Podcast | {}", SITE_NAME), &body)
}

/// `/episodes/{id}`
pub fn episode(page: &EpisodePage) -> String {
    let episode = &page.episode;
    let body = format!(
        "<div class=\"episode\">\n<div class=\"thumbnailContainer\">\n\
         <a href=\"/\"><button type=\"button\"><img src=\"/arrow-left.svg\" alt=\"Voltar\"></button></a>\n\
         <img width=\"700\" height=\"160\" src=\"{thumb}\" alt=\"{alt}\">\n\
         <button type=\"button\" data-play=\"{id}\"><img src=\"/play.svg\" alt=\"Tocar episodio\"></button>\n\
         </div>\n<header>\n<h1>{title}</h1>\n<span>{members}</span>\n<span>{date}</span>\n<span>{duration}</span>\n</header>\n\
         <div class=\"description\">{description}</div>\n</div>",
        thumb = encode_attribute(&episode.thumbnail),
        alt = encode_attribute(&episode.title),
        id = encode_minimal(&episode.id),
        title = encode_minimal(&episode.title),
        members = encode_minimal(&episode.members),
        date = encode_minimal(&episode.published_at_display()),
        duration = episode.duration_as_string(),
        description = episode.description.as_deref().unwrap_or_default(),
    );
    layout(&format!("{} | {}", episode.title, SITE_NAME), &body)
}

pub fn not_found(what: &str) -> String {
    layout(
        &format!("Not found | {}", SITE_NAME),
        &format!(
            "<h1>404</h1>\n<p>{} not found.</p>\n<a href=\"/\">Voltar</a>",
            encode_minimal(what)
        ),
    )
}

pub fn unavailable(message: &str) -> String {
    layout(
        &format!("Unavailable | {}", SITE_NAME),
        &format!(
            "<h1>502</h1>\n<p>Page could not be generated: {}</p>",
            encode_minimal(message)
        ),
    )
}
