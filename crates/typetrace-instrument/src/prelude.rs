//! The host-guarded runtime prelude.
//!
//! A single physical line of JavaScript prepended to each instrumented
//! file. It defines a queueing `twiz` global only when one is absent, and
//! tests every host binding it touches before use, so it is inert on hosts
//! without timers or an HTTP client. Records queue per (filename, offset)
//! and flush on a single-shot timer in the wire batch format.

/// Build the prelude for the given collector endpoint and flush period.
/// The result contains no newline, so original line numbers survive.
pub fn prelude(collector_url: &str, flush_interval_ms: u64) -> String {
    let url = serde_json::to_string(collector_url).unwrap_or_else(|_| "\"\"".to_string());
    format!(
        "(function(g){{if(!g||typeof g.twiz==='function')return;\
var q={{}},t=null;\
function flush(){{var b=[],k;for(k in q){{b.push(q[k]);}}q={{}};t=null;if(b.length===0)return;\
try{{var body=JSON.stringify(b);\
if(typeof fetch==='function'){{fetch({url},{{method:'POST',headers:{{'Content-Type':'application/json'}},body:body}});}}\
else if(typeof XMLHttpRequest!=='undefined'){{var x=new XMLHttpRequest();x.open('POST',{url});x.setRequestHeader('Content-Type','application/json');x.send(body);}}\
}}catch(e){{}}}}\
g.twiz=function(label,value,offset,filename,metadata){{\
try{{var k=filename+'\\u0000'+offset;var e=q[k];if(!e){{e=q[k]=[filename,offset,[],metadata];}}\
e[2].push([value,null]);\
if(t===null&&typeof setTimeout==='function'){{t=setTimeout(flush,{flush_interval_ms});}}\
}}catch(e){{}}}};\
}})(typeof globalThis!=='undefined'?globalThis:typeof window!=='undefined'?window:typeof global!=='undefined'?global:null);"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prelude_is_a_single_line() {
        let p = prelude("http://127.0.0.1:4302/ingest", 2000);
        assert!(!p.contains('\n'));
        assert!(p.contains("g.twiz=function"));
        assert!(p.contains("http://127.0.0.1:4302/ingest"));
        assert!(p.contains("setTimeout(flush,2000)"));
    }

    #[test]
    fn url_is_json_escaped() {
        let p = prelude("http://example.com/\"quoted\"", 100);
        assert!(p.contains("\\\"quoted\\\""));
    }
}
